//! Pre-populate a target with the defaults declared on its fields.
//!
//! Adapters run the injector before decoding, so that decoders only ever
//! overwrite: a field that is missing from the input keeps its default.
use jiff::tz::TimeZone;

use crate::errors::{BindError, ConversionError};
use crate::field::{Bind, FieldDescriptor, FieldSpec, FieldVisitor, ParseFailure, Slot, parse_time};
use crate::registry::Registry;

/// The default declared for `field`.
///
/// It comes from the `default=` option of the `tag_key` tag or, if that tag is
/// absent, empty or `-`, from the field's bare `default` tag.
pub fn default_for(field: &FieldDescriptor, tag_key: &str) -> Option<&'static str> {
    match field.tag(tag_key) {
        None | Some("") | Some("-") => field.tag("default").filter(|d| !d.is_empty()),
        Some(_) => FieldSpec::resolve(field, tag_key).default_value,
    }
}

/// Assign every declared default to the fields of `target`, recursing into nested structs.
///
/// Unset `Option`s are left unset. Set ones are descended into.
///
/// ```rust
/// use tagbind::{Bind, Registry};
/// use tagbind::defaults::inject_defaults;
///
/// #[derive(Bind, Default)]
/// struct Paging {
///     #[bind(form = "page,default=1")]
///     page: u32,
///     #[bind(default = "20")]
///     per_page: u32,
/// }
///
/// let mut paging = Paging::default();
/// inject_defaults(&mut paging, "form", &Registry::with_builtins(), &jiff::tz::TimeZone::UTC).unwrap();
/// assert_eq!((paging.page, paging.per_page), (1, 20));
/// ```
pub fn inject_defaults(
    target: &mut dyn Bind,
    tag_key: &str,
    registry: &Registry,
    time_zone: &TimeZone,
) -> Result<(), BindError> {
    target.visit_fields(&mut DefaultInjector {
        tag_key,
        registry,
        time_zone,
    })
}

struct DefaultInjector<'a> {
    tag_key: &'a str,
    registry: &'a Registry,
    time_zone: &'a TimeZone,
}

fn invalid_default(field: &FieldDescriptor, expected: &'static str, failure: ParseFailure) -> BindError {
    ConversionError {
        field: field.name(),
        raw: failure.raw,
        expected,
        source: failure.source,
    }
    .into()
}

impl FieldVisitor for DefaultInjector<'_> {
    fn visit(&mut self, field: &FieldDescriptor, slot: Slot<'_>) -> Result<(), BindError> {
        let default = default_for(field, self.tag_key);
        let Some(mut slot) = slot.into_set_pointee() else {
            return Ok(());
        };

        if let Some(default) = default {
            if let Some(convert) = self.registry.get(slot.type_id()) {
                let values = [default.to_owned()];
                return convert(&values, slot.as_any_mut()).map_err(|e| {
                    ConversionError {
                        field: field.name(),
                        raw: default.to_owned(),
                        expected: e.expected,
                        source: e.source,
                    }
                    .into()
                });
            }
        }

        match (slot, default) {
            (Slot::Nested(nested), None) => nested.visit_fields(self),
            (Slot::Time(time), Some(default)) => {
                let zoned = parse_time(default, field, self.time_zone)
                    .map_err(|e| invalid_default(field, "jiff::Zoned", e))?;
                time.set_zoned(zoned);
                Ok(())
            }
            (Slot::Scalar(scalar), Some(default)) => {
                let expected = scalar.expected();
                scalar
                    .set_text(default)
                    .map_err(|e| invalid_default(field, expected, e))
            }
            (Slot::List(list), Some(default)) => {
                let expected = list.expected();
                list.set_texts(&[default.to_owned()])
                    .map_err(|e| invalid_default(field, expected, e))
            }
            _ => Ok(()),
        }
    }
}
