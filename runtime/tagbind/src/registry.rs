use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::ConverterError;
use crate::nullable::{
    NullBool, NullDate, NullFloat32, NullFloat32s, NullFloat64, NullFloat64s, NullInt, NullInt32,
    NullInt32s, NullInt64, NullInt64s, NullInts, NullString, NullStrings, NullTime, Scannable,
};

/// Convert a list of form values and store the result into the field behind `slot`.
pub type Converter =
    Arc<dyn Fn(&[String], &mut dyn Any) -> Result<(), ConverterError> + Send + Sync>;

/// Converters for field types that the walkers can't handle on their own.
///
/// A converter receives every value submitted for a field and produces the field's new value.
/// Lookups are keyed by the **exact** type of the field: a converter registered for `T`
/// isn't used for `Option<T>`, but it is used for the pointee once the walker
/// has allocated it.
///
/// The registry can be shared across threads and extended after it has been handed
/// to a [`Binder`](crate::Binder).
///
/// ```rust
/// use tagbind::Registry;
///
/// #[derive(Debug, Default, PartialEq)]
/// pub struct Csv(Vec<String>);
///
/// let registry = Registry::with_builtins();
/// registry.register(|values: &[String]| {
///     Ok::<_, std::convert::Infallible>(Csv(values[0].split(',').map(str::to_owned).collect()))
/// });
/// assert!(registry.contains::<Csv>());
/// ```
pub struct Registry {
    converters: RwLock<HashMap<TypeId, Converter>>,
}

impl Registry {
    /// A registry with no converters.
    pub fn empty() -> Self {
        Self {
            converters: RwLock::new(HashMap::new()),
        }
    }

    /// A registry with a converter for every [nullable](crate::nullable) type.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        registry.register_scannable::<NullString>();
        registry.register_scannable::<NullInt>();
        registry.register_scannable::<NullInt32>();
        registry.register_scannable::<NullInt64>();
        registry.register_scannable::<NullFloat32>();
        registry.register_scannable::<NullFloat64>();
        registry.register_scannable::<NullBool>();
        registry.register_scannable::<NullDate>();
        registry.register_scannable::<NullTime>();
        registry.register_scannable::<NullStrings>();
        registry.register_scannable::<NullInts>();
        registry.register_scannable::<NullInt32s>();
        registry.register_scannable::<NullInt64s>();
        registry.register_scannable::<NullFloat32s>();
        registry.register_scannable::<NullFloat64s>();
        registry
    }

    /// Register `convert` as the converter for fields of type `T`.
    ///
    /// It replaces any converter previously registered for `T`.
    pub fn register<T, E, F>(&self, convert: F)
    where
        T: Any,
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&[String]) -> Result<T, E> + Send + Sync + 'static,
    {
        let converter: Converter = Arc::new(move |values: &[String], slot: &mut dyn Any| {
            let value = convert(values).map_err(|e| ConverterError {
                expected: type_name::<T>(),
                source: Box::new(e),
            })?;
            let Some(slot) = slot.downcast_mut::<T>() else {
                return Err(ConverterError {
                    expected: type_name::<T>(),
                    source: "the converter was invoked on a field of a different type".into(),
                });
            };
            *slot = value;
            Ok(())
        });
        self.converters.write().insert(TypeId::of::<T>(), converter);
    }

    /// Register a converter for a [`Scannable`] type, scanning the form values into it.
    pub fn register_scannable<T>(&self)
    where
        T: Scannable + Default + Any,
    {
        self.register(|values: &[String]| {
            let mut scanned = T::default();
            scanned.scan(T::form_value(values))?;
            Ok::<_, crate::errors::ScanError>(scanned)
        });
    }

    /// The converter for fields of type `type_id`, if any.
    pub fn get(&self, type_id: TypeId) -> Option<Converter> {
        self.converters.read().get(&type_id).cloned()
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.converters.read().contains_key(&TypeId::of::<T>())
    }

    /// The number of registered converters.
    pub fn len(&self) -> usize {
        self.converters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.read().is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("converters", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::any::{Any, TypeId};
    use std::sync::Arc;

    use super::Registry;
    use crate::nullable::{NullInt32, NullStrings};

    #[test]
    fn builtins_cover_every_nullable_type() {
        assert_eq!(Registry::with_builtins().len(), 15);
        assert!(Registry::empty().is_empty());
    }

    #[test]
    fn converters_receive_every_form_value() {
        let registry = Registry::with_builtins();
        let convert = registry.get(TypeId::of::<NullStrings>()).unwrap();

        let mut field = NullStrings::default();
        convert(&["a".into(), "b".into()], &mut field as &mut dyn Any).unwrap();

        assert!(field.valid);
        assert_eq!(field.val, vec!["a", "b"]);
    }

    #[test]
    fn conversion_errors_name_the_target_type() {
        let registry = Registry::with_builtins();
        let convert = registry.get(TypeId::of::<NullInt32>()).unwrap();

        let mut field = NullInt32::default();
        let err = convert(&["abc".into()], &mut field as &mut dyn Any).unwrap_err();

        insta::assert_snapshot!(err, @r"
        Failed to convert the input into `tagbind::nullable::Nullable<i32>`.
        Can't scan `abc` into `i32`: invalid digit found in string
        ");
        assert!(!field.valid);
    }

    #[test]
    fn late_registration_is_visible_to_concurrent_readers() {
        #[derive(Debug, Default, PartialEq)]
        struct Upper(String);

        let registry = Arc::new(Registry::empty());
        let reader = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                while !registry.contains::<Upper>() {
                    std::thread::yield_now();
                }
            })
        };
        registry.register(|values: &[String]| {
            Ok::<_, std::convert::Infallible>(Upper(values[0].to_uppercase()))
        });
        reader.join().unwrap();

        let mut field = Upper::default();
        let convert = registry.get(TypeId::of::<Upper>()).unwrap();
        convert(&["shout".into()], &mut field as &mut dyn Any).unwrap();
        assert_eq!(field, Upper("SHOUT".into()));
    }
}
