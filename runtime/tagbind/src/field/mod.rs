//! The per-field metadata that drives binding.
//!
//! `#[derive(Bind)]` generates, for every named field, a [`FieldDescriptor`]
//! (the field name plus its tags) and hands it to a [`FieldVisitor`] together
//! with a [`Slot`]: a mutable handle on the field, classified by what kind of
//! data it can hold.
//!
//! The walkers in [`crate::walker`] and the injector in [`crate::defaults`]
//! are both visitors.
use std::any::{Any, TypeId};

use crate::errors::{BindError, BoxError};
use crate::upload::FileHeader;
use crate::value::Value;

pub use primitive::Primitive;
pub(crate) use primitive::parse_bool;
pub use time::{TimeOptions, parse_time, zero_time};

mod primitive;
mod time;

/// A struct whose fields can be bound from loosely-typed input.
///
/// Implement it with `#[derive(Bind)]`.
pub trait Bind: Any {
    /// Hand every field, in declaration order, to `visitor`.
    ///
    /// The walk stops at the first error returned by the visitor.
    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<(), BindError>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Something that processes the fields of a [`Bind`] type, one at a time.
pub trait FieldVisitor {
    fn visit(&mut self, field: &FieldDescriptor, slot: Slot<'_>) -> Result<(), BindError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The static description of a struct field: its name and its binding tags.
pub struct FieldDescriptor {
    name: &'static str,
    tags: &'static [(&'static str, &'static str)],
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, tags: &'static [(&'static str, &'static str)]) -> Self {
        Self { name, tags }
    }

    /// The field name, as declared in the struct.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The raw value of the tag named `key`, if the field carries it.
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find_map(|(k, v)| (*k == key).then_some(*v))
    }

    /// `true` if the tag named `key` is present and set to a truthy value.
    pub fn flag(&self, key: &str) -> bool {
        self.tag(key)
            .is_some_and(|v| parse_bool(v).unwrap_or(false))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a field participates in binding for a given tag key.
///
/// It's derived from the field's tag, formatted as `name[,default=<value>]`.
pub struct FieldSpec {
    /// The key to look up in the input. Empty if the field is untagged.
    pub binding_name: &'static str,
    /// The value to use when the key is missing from the input.
    pub default_value: Option<&'static str>,
    /// The field must never be bound (its binding name is `-`).
    pub skipped: bool,
}

impl FieldSpec {
    pub fn resolve(field: &FieldDescriptor, tag_key: &str) -> Self {
        let raw = field.tag(tag_key).unwrap_or_default();
        let (binding_name, rest) = match raw.split_once(',') {
            Some((name, rest)) => (name, Some(rest)),
            None => (raw, None),
        };
        let default_value = rest
            .and_then(|rest| rest.strip_prefix("default="))
            .filter(|value| !value.is_empty());
        Self {
            binding_name,
            default_value,
            skipped: binding_name == "-",
        }
    }
}

/// A value couldn't be parsed into the type of the field it was meant for.
#[derive(Debug)]
pub struct ParseFailure {
    pub raw: String,
    pub source: BoxError,
}

impl ParseFailure {
    pub fn new(raw: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            raw: raw.into(),
            source: source.into(),
        }
    }
}

/// A mutable handle on a field, classified by the kind of data it holds.
pub enum Slot<'a> {
    /// A primitive: numbers, booleans and strings.
    Scalar(&'a mut dyn ScalarField),
    /// A vector of primitives.
    List(&'a mut dyn ListField),
    /// A point in time.
    Time(&'a mut dyn TimeField),
    /// Another `#[derive(Bind)]` struct.
    Nested(&'a mut dyn Bind),
    /// An optional value, allocated on demand.
    Pointer(&'a mut dyn PointerField),
    /// Uploaded files, only bound by multipart adapters.
    File(&'a mut dyn FileField),
    /// Any other type. It can only be bound through a converter in the [`Registry`](crate::Registry).
    Custom(&'a mut dyn CustomField),
}

impl<'a> Slot<'a> {
    pub fn as_any_mut(&mut self) -> &mut dyn Any {
        match self {
            Slot::Scalar(s) => s.as_any_mut(),
            Slot::List(l) => l.as_any_mut(),
            Slot::Time(t) => t.as_any_mut(),
            Slot::Nested(n) => n.as_any_mut(),
            Slot::Pointer(p) => p.as_any_mut(),
            Slot::File(f) => f.as_any_mut(),
            Slot::Custom(c) => c.as_any_mut(),
        }
    }

    /// The exact type of the field behind this slot.
    pub fn type_id(&mut self) -> TypeId {
        let any = self.as_any_mut();
        // Dispatch on the trait object, not on the reference.
        (*any).type_id()
    }

    /// Follow pointers down to their pointee, stopping at the first unset one.
    pub fn into_set_pointee(self) -> Option<Slot<'a>> {
        match self {
            Slot::Pointer(p) => p.pointee_if_set()?.into_set_pointee(),
            other => Some(other),
        }
    }
}

/// A field holding a single [`Primitive`].
pub trait ScalarField {
    /// The name of the field's type.
    fn expected(&self) -> &'static str;

    /// Parse `raw` and assign it.
    ///
    /// Empty input parses as the type's zero value.
    fn set_text(&mut self, raw: &str) -> Result<(), ParseFailure>;

    /// Assign a dynamic value, if it has the field's exact type or can be widened into it.
    ///
    /// Returns `false`, leaving the field untouched, otherwise.
    fn set_value(&mut self, value: &Value) -> bool;

    /// The current value, as handed to a database driver.
    fn to_value(&self) -> Value;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A field holding a vector of [`Primitive`]s.
pub trait ListField {
    /// The name of the element type.
    fn expected(&self) -> &'static str;

    /// Parse every element and replace the vector's contents.
    ///
    /// The field is left untouched if any element fails to parse.
    fn set_texts(&mut self, raw: &[String]) -> Result<(), ParseFailure>;

    /// Convert every element and replace the vector's contents.
    ///
    /// The field is left untouched if any element fails to convert.
    fn set_values(&mut self, values: &[Value]) -> Result<(), ParseFailure>;

    fn to_values(&self) -> Vec<Value>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A field holding a point in time.
pub trait TimeField {
    fn set_zoned(&mut self, zoned: jiff::Zoned);

    /// The civil datetime of the instant, in its own time zone.
    fn to_value(&self) -> Value;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A field that may or may not hold a value.
pub trait PointerField {
    fn is_set(&self) -> bool;

    /// The pointee, allocated with its default value if unset.
    fn pointee(&mut self) -> Slot<'_>;

    /// The pointee, if set.
    fn pointee_if_set(&mut self) -> Option<Slot<'_>>;

    /// Drop the pointee, if any.
    fn reset(&mut self);

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A field holding uploaded files.
pub trait FileField {
    /// Assign the files uploaded under the field's binding name.
    fn set_files(&mut self, files: Vec<FileHeader>);

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A field whose type is only known to the [`Registry`](crate::Registry).
///
/// ```rust
/// use std::any::Any;
/// use tagbind::field::{BindField, CustomField, Slot};
///
/// #[derive(Default)]
/// pub struct Cents(u64);
///
/// impl CustomField for Cents {
///     fn type_name(&self) -> &'static str {
///         "Cents"
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
///
/// impl BindField for Cents {
///     fn slot(&mut self) -> Slot<'_> {
///         Slot::Custom(self)
///     }
/// }
/// ```
pub trait CustomField {
    fn type_name(&self) -> &'static str;

    /// The value to hand to a database driver, if the type has one.
    fn to_value(&self) -> Option<Value> {
        None
    }

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A type that can be the field of a `#[derive(Bind)]` struct.
///
/// Implemented for primitives, vectors of primitives, `Option`, `Box`,
/// [`jiff::Zoned`], [`jiff::Timestamp`], the [nullable](crate::nullable) types
/// and the [upload](crate::upload) wrappers.
/// Implement it for your own types with [`Slot::Custom`] and register a converter
/// in the [`Registry`](crate::Registry).
pub trait BindField {
    fn slot(&mut self) -> Slot<'_>;
}

impl<T> BindField for Option<T>
where
    T: BindField + Default + Any,
{
    fn slot(&mut self) -> Slot<'_> {
        Slot::Pointer(self)
    }
}

impl<T> PointerField for Option<T>
where
    T: BindField + Default + Any,
{
    fn is_set(&self) -> bool {
        self.is_some()
    }

    fn pointee(&mut self) -> Slot<'_> {
        self.get_or_insert_with(T::default).slot()
    }

    fn pointee_if_set(&mut self) -> Option<Slot<'_>> {
        self.as_mut().map(BindField::slot)
    }

    fn reset(&mut self) {
        *self = None;
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: BindField + ?Sized> BindField for Box<T> {
    fn slot(&mut self) -> Slot<'_> {
        (**self).slot()
    }
}
