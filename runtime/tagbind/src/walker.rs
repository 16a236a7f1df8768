//! The struct walkers: they map a flat key/value source onto the fields of a [`Bind`] type.
//!
//! - [`map_form`] binds from a [`FormValues`] multimap. It powers the form family
//!   and the URI adapter.
//! - [`map_array`] binds from a map of dynamic [`Value`]s.
//! - [`map_files`] assigns uploaded files to [`File`](crate::upload::File) and
//!   [`Files`](crate::upload::Files) fields.
//!
//! Every walker aborts on the first error. Fields assigned before the failing one
//! are not rolled back.
use indexmap::IndexMap;
use jiff::tz::TimeZone;

use crate::errors::{BindError, ConversionError, ConverterError, UnsupportedKindError};
use crate::field::{
    Bind, FieldDescriptor, FieldSpec, FieldVisitor, ParseFailure, PointerField, Slot, parse_time,
};
use crate::form_values::FormValues;
use crate::registry::Registry;
use crate::upload::FileHeader;
use crate::value::Value;

/// Bind `source` onto `target`, resolving binding names from the `tag_key` tag of every field.
///
/// ```rust
/// use tagbind::{Bind, FormValues, Registry};
/// use tagbind::walker::map_form;
///
/// #[derive(Bind, Default)]
/// struct Search {
///     #[bind(form = "q")]
///     query: String,
///     #[bind(form = "page,default=1")]
///     page: u32,
/// }
///
/// let mut search = Search::default();
/// let source = FormValues::parse(b"q=rust");
/// map_form(&mut search, &source, "form", &Registry::with_builtins(), &jiff::tz::TimeZone::UTC).unwrap();
///
/// assert_eq!(search.query, "rust");
/// assert_eq!(search.page, 1);
/// ```
pub fn map_form(
    target: &mut dyn Bind,
    source: &FormValues,
    tag_key: &str,
    registry: &Registry,
    time_zone: &TimeZone,
) -> Result<(), BindError> {
    let mut mapper = FormMapper {
        source,
        tag_key,
        registry,
        time_zone,
        bound: false,
    };
    target.visit_fields(&mut mapper)
}

/// Bind `source` onto `target`, resolving binding names from the `array` tag of every field.
///
/// Untagged leaves are looked up by their declared field name.
pub fn map_array(
    target: &mut dyn Bind,
    source: &IndexMap<String, Value>,
    registry: &Registry,
    time_zone: &TimeZone,
) -> Result<(), BindError> {
    let mut mapper = ArrayMapper {
        source,
        registry,
        time_zone,
        bound: false,
    };
    target.visit_fields(&mut mapper)
}

/// Assign uploaded files to the file fields of `target`, matching them by their `form` tag.
pub fn map_files(
    target: &mut dyn Bind,
    files: &IndexMap<String, Vec<FileHeader>>,
) -> Result<(), BindError> {
    target.visit_fields(&mut FileMapper { files })
}

fn conversion_error(
    field: &FieldDescriptor,
    expected: &'static str,
    failure: ParseFailure,
) -> BindError {
    ConversionError {
        field: field.name(),
        raw: failure.raw,
        expected,
        source: failure.source,
    }
    .into()
}

fn converter_error(field: &FieldDescriptor, raw: &[String], e: ConverterError) -> BindError {
    ConversionError {
        field: field.name(),
        raw: raw.join(","),
        expected: e.expected,
        source: e.source,
    }
    .into()
}

fn unsupported(field: &FieldDescriptor, type_name: &'static str) -> BindError {
    UnsupportedKindError {
        field: field.name(),
        type_name,
    }
    .into()
}

/// Run the converter registered for the exact type behind `slot`, if there is one.
fn convert_with_registry(
    registry: &Registry,
    field: &FieldDescriptor,
    slot: &mut Slot<'_>,
    values: &[String],
) -> Option<Result<(), BindError>> {
    let convert = registry.get(slot.type_id())?;
    Some(convert(values, slot.as_any_mut()).map_err(|e| converter_error(field, values, e)))
}

/// A walker that records whether it assigned anything.
///
/// Unset `Option`s are allocated on the way down and released again if nothing
/// was bound into them, so that an absent key leaves them `None`.
trait Assigning: Sized {
    fn bound(&mut self) -> &mut bool;

    fn through_pointer(
        &mut self,
        pointer: &mut dyn PointerField,
        then: impl FnOnce(&mut Self, Slot<'_>) -> Result<(), BindError>,
    ) -> Result<(), BindError> {
        let was_set = pointer.is_set();
        let outer = std::mem::replace(self.bound(), false);
        let outcome = then(self, pointer.pointee());
        let bound = *self.bound();
        if !was_set && !bound {
            pointer.reset();
        }
        *self.bound() = outer || bound;
        outcome
    }
}

struct FormMapper<'a> {
    source: &'a FormValues,
    tag_key: &'a str,
    registry: &'a Registry,
    time_zone: &'a TimeZone,
    bound: bool,
}

impl Assigning for FormMapper<'_> {
    fn bound(&mut self) -> &mut bool {
        &mut self.bound
    }
}

impl FormMapper<'_> {
    /// Recurse into an untagged field. Untagged leaves are never bound.
    fn descend(&mut self, slot: Slot<'_>) -> Result<(), BindError> {
        match slot {
            Slot::Nested(nested) => nested.visit_fields(self),
            Slot::Pointer(pointer) => {
                self.through_pointer(pointer, |mapper, pointee| mapper.descend(pointee))
            }
            _ => Ok(()),
        }
    }

    fn assign(
        &mut self,
        field: &FieldDescriptor,
        slot: Slot<'_>,
        values: &[String],
    ) -> Result<(), BindError> {
        let mut slot = match slot {
            Slot::Pointer(pointer) => {
                return self.through_pointer(pointer, |mapper, pointee| {
                    mapper.assign(field, pointee, values)
                });
            }
            other => other,
        };
        if let Some(outcome) = convert_with_registry(self.registry, field, &mut slot, values) {
            outcome?;
            self.bound = true;
            return Ok(());
        }
        match slot {
            Slot::List(list) => {
                let expected = list.expected();
                list.set_texts(values)
                    .map_err(|e| conversion_error(field, expected, e))?;
            }
            Slot::Time(time) => {
                let zoned = parse_time(&values[0], field, self.time_zone)
                    .map_err(|e| conversion_error(field, "jiff::Zoned", e))?;
                time.set_zoned(zoned);
            }
            Slot::Scalar(scalar) => {
                let expected = scalar.expected();
                scalar
                    .set_text(&values[0])
                    .map_err(|e| conversion_error(field, expected, e))?;
            }
            // A struct can't be assigned from a flat string.
            Slot::Nested(_) | Slot::File(_) | Slot::Pointer(_) => return Ok(()),
            Slot::Custom(custom) => return Err(unsupported(field, custom.type_name())),
        }
        self.bound = true;
        Ok(())
    }
}

impl FieldVisitor for FormMapper<'_> {
    fn visit(&mut self, field: &FieldDescriptor, slot: Slot<'_>) -> Result<(), BindError> {
        if matches!(slot, Slot::File(_)) {
            return Ok(());
        }
        let spec = FieldSpec::resolve(field, self.tag_key);
        if spec.skipped {
            tracing::trace!(field = field.name(), "Field excluded from binding, skipping");
            return Ok(());
        }
        if spec.binding_name.is_empty() {
            return self.descend(slot);
        }

        let source = self.source;
        let defaulted;
        let values = match source.get(spec.binding_name) {
            Some(values) if !values.is_empty() => values,
            _ => match spec.default_value {
                Some(default) => {
                    defaulted = [default.to_owned()];
                    &defaulted[..]
                }
                None => {
                    tracing::trace!(
                        field = field.name(),
                        key = spec.binding_name,
                        "No input for field, skipping"
                    );
                    return Ok(());
                }
            },
        };
        if values[0].is_empty() {
            return Ok(());
        }
        self.assign(field, slot, values)
    }
}

struct ArrayMapper<'a> {
    source: &'a IndexMap<String, Value>,
    registry: &'a Registry,
    time_zone: &'a TimeZone,
    bound: bool,
}

impl Assigning for ArrayMapper<'_> {
    fn bound(&mut self) -> &mut bool {
        &mut self.bound
    }
}

impl ArrayMapper<'_> {
    /// Recurse into untagged structs. Untagged leaves are looked up by field name.
    fn untagged(
        &mut self,
        field: &FieldDescriptor,
        spec: FieldSpec,
        slot: Slot<'_>,
    ) -> Result<(), BindError> {
        match slot {
            Slot::Nested(nested) => nested.visit_fields(self),
            Slot::Pointer(pointer) => self.through_pointer(pointer, |mapper, pointee| {
                mapper.untagged(field, spec, pointee)
            }),
            leaf => self.lookup(field, spec, field.name(), leaf),
        }
    }

    fn lookup(
        &mut self,
        field: &FieldDescriptor,
        spec: FieldSpec,
        key: &str,
        slot: Slot<'_>,
    ) -> Result<(), BindError> {
        let source = self.source;
        let value = source.get(key).filter(|v| !v.is_null());
        if value.is_none() && spec.default_value.is_none() {
            tracing::trace!(field = field.name(), key, "No input for field, skipping");
            return Ok(());
        }
        self.assign(field, spec, value, slot)
    }

    fn assign(
        &mut self,
        field: &FieldDescriptor,
        spec: FieldSpec,
        value: Option<&Value>,
        slot: Slot<'_>,
    ) -> Result<(), BindError> {
        let mut slot = match slot {
            Slot::Pointer(pointer) => {
                return self.through_pointer(pointer, |mapper, pointee| {
                    mapper.assign(field, spec, value, pointee)
                });
            }
            other => other,
        };

        if let Some(convert) = self.registry.get(slot.type_id()) {
            let texts = match value {
                Some(value) => value.to_texts(),
                None => spec.default_value.map(|d| vec![d.to_owned()]),
            };
            let Some(texts) = texts else {
                return Ok(());
            };
            convert(&texts, slot.as_any_mut()).map_err(|e| converter_error(field, &texts, e))?;
            self.bound = true;
            return Ok(());
        }

        // Same type first, then numeric widening.
        if let (Slot::Scalar(scalar), Some(value)) = (&mut slot, value) {
            if scalar.set_value(value) {
                self.bound = true;
                return Ok(());
            }
        }
        if let (Slot::List(list), Some(Value::List(items))) = (&mut slot, value) {
            let expected = list.expected();
            list.set_values(items)
                .map_err(|e| conversion_error(field, expected, e))?;
            self.bound = true;
            return Ok(());
        }

        let rendered = value.and_then(Value::as_text);
        let text = match (&rendered, spec.default_value) {
            (Some(text), _) => &**text,
            (None, Some(default)) => default,
            (None, None) => return Ok(()),
        };
        if self.bind_text(field, slot, text)? {
            self.bound = true;
        }
        Ok(())
    }

    /// Returns `false` if `slot` can't hold text.
    fn bind_text(
        &self,
        field: &FieldDescriptor,
        slot: Slot<'_>,
        text: &str,
    ) -> Result<bool, BindError> {
        match slot {
            Slot::Time(time) => {
                let zoned = parse_time(text, field, self.time_zone)
                    .map_err(|e| conversion_error(field, "jiff::Zoned", e))?;
                time.set_zoned(zoned);
            }
            Slot::Scalar(scalar) => {
                let expected = scalar.expected();
                scalar
                    .set_text(text)
                    .map_err(|e| conversion_error(field, expected, e))?;
            }
            Slot::List(list) => {
                let expected = list.expected();
                list.set_texts(&[text.to_owned()])
                    .map_err(|e| conversion_error(field, expected, e))?;
            }
            Slot::Nested(_) | Slot::File(_) | Slot::Pointer(_) => return Ok(false),
            Slot::Custom(custom) => return Err(unsupported(field, custom.type_name())),
        }
        Ok(true)
    }
}

impl FieldVisitor for ArrayMapper<'_> {
    fn visit(&mut self, field: &FieldDescriptor, slot: Slot<'_>) -> Result<(), BindError> {
        let spec = FieldSpec::resolve(field, "array");
        if spec.skipped {
            tracing::trace!(field = field.name(), "Field excluded from binding, skipping");
            return Ok(());
        }
        if spec.binding_name.is_empty() {
            return self.untagged(field, spec, slot);
        }
        self.lookup(field, spec, spec.binding_name, slot)
    }
}

struct FileMapper<'a> {
    files: &'a IndexMap<String, Vec<FileHeader>>,
}

impl FieldVisitor for FileMapper<'_> {
    fn visit(&mut self, field: &FieldDescriptor, slot: Slot<'_>) -> Result<(), BindError> {
        let spec = FieldSpec::resolve(field, "form");
        if spec.skipped {
            return Ok(());
        }
        let Some(slot) = slot.into_set_pointee() else {
            return Ok(());
        };
        match slot {
            Slot::File(file) => {
                if let Some(headers) = self.files.get(spec.binding_name).filter(|h| !h.is_empty()) {
                    file.set_files(headers.clone());
                }
                Ok(())
            }
            Slot::Nested(nested) if spec.binding_name.is_empty() => nested.visit_fields(self),
            _ => Ok(()),
        }
    }
}
