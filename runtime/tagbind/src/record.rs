//! Turn a bound struct back into a map of its values, keyed by binding name.
//!
//! It's the reverse of [`map_array`](crate::walker::map_array): the output of
//! [`db_values`] can be handed to a database layer as the columns of an
//! `INSERT` or an `UPDATE`.
use indexmap::IndexMap;

use crate::errors::BindError;
use crate::field::{Bind, FieldDescriptor, FieldSpec, FieldVisitor, Slot};
use crate::value::Value;

/// The values of every field of `target` carrying a `db` tag.
///
/// ```rust
/// use tagbind::{Bind, Value};
/// use tagbind::nullable::NullString;
/// use tagbind::record::db_values;
///
/// #[derive(Bind, Default)]
/// struct User {
///     #[bind(db = "id")]
///     id: i64,
///     #[bind(db = "nickname")]
///     nickname: NullString,
///     #[bind(db = "referrer")]
///     referrer: Option<i64>,
/// }
///
/// let mut user = User { id: 7, ..User::default() };
/// let values = db_values(&mut user).unwrap();
///
/// assert_eq!(values["id"], Value::Int(7));
/// assert_eq!(values["nickname"], Value::Null);
/// assert!(!values.contains_key("referrer"));
/// ```
pub fn db_values(target: &mut dyn Bind) -> Result<IndexMap<String, Value>, BindError> {
    tagged_values(target, "db")
}

/// The values of every field of `target` carrying a `tag_key` tag.
///
/// - Unset `Option`s are left out.
/// - Nullable types contribute their driver value, [`Value::Null`] when invalid.
/// - Untagged (or `-`) nested structs are flattened into the same map.
/// - Custom types without a driver value are left out.
pub fn tagged_values(
    target: &mut dyn Bind,
    tag_key: &str,
) -> Result<IndexMap<String, Value>, BindError> {
    let mut collector = ValueCollector {
        tag_key,
        values: IndexMap::new(),
    };
    target.visit_fields(&mut collector)?;
    Ok(collector.values)
}

struct ValueCollector<'a> {
    tag_key: &'a str,
    values: IndexMap<String, Value>,
}

impl FieldVisitor for ValueCollector<'_> {
    fn visit(&mut self, field: &FieldDescriptor, slot: Slot<'_>) -> Result<(), BindError> {
        let spec = FieldSpec::resolve(field, self.tag_key);
        let Some(slot) = slot.into_set_pointee() else {
            return Ok(());
        };
        if spec.binding_name.is_empty() || spec.skipped {
            if let Slot::Nested(nested) = slot {
                return nested.visit_fields(self);
            }
            return Ok(());
        }

        let value = match slot {
            Slot::Scalar(scalar) => scalar.to_value(),
            Slot::List(list) => Value::List(list.to_values()),
            Slot::Time(time) => time.to_value(),
            Slot::Nested(nested) => Value::Map(tagged_values(nested, self.tag_key)?),
            Slot::Custom(custom) => match custom.to_value() {
                Some(value) => value,
                None => {
                    tracing::trace!(
                        field = field.name(),
                        type_name = custom.type_name(),
                        "Field has no driver value, skipping"
                    );
                    return Ok(());
                }
            },
            Slot::File(_) | Slot::Pointer(_) => return Ok(()),
        };
        self.values.insert(spec.binding_name.to_owned(), value);
        Ok(())
    }
}
