use indexmap::IndexMap;

use super::{BindArray, Binding};
use crate::binder::BindContext;
use crate::errors::BindError;
use crate::field::Bind;
use crate::value::Value;
use crate::walker::map_array;

#[derive(Debug, Clone, Copy, Default)]
/// Bind a map of dynamic values, e.g. a decoded JSON object, using the `array` tags.
///
/// Untagged fields are looked up by their declared name. No defaults are injected
/// beyond the `default=` options of the `array` tags.
pub struct ArrayBinding;

impl Binding for ArrayBinding {
    fn name(&self) -> &'static str {
        "array"
    }
}

impl<T: Bind> BindArray<T> for ArrayBinding {
    fn bind_array(
        &self,
        cx: &BindContext<'_>,
        source: &IndexMap<String, Value>,
        target: &mut T,
    ) -> Result<(), BindError> {
        map_array(target, source, cx.registry, cx.time_zone)?;
        cx.validate(target)
    }
}
