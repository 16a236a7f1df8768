use super::{BindUri, Binding};
use crate::binder::BindContext;
use crate::errors::BindError;
use crate::field::Bind;
use crate::form_values::FormValues;
use crate::walker::map_form;

#[derive(Debug, Clone, Copy, Default)]
/// Bind path parameters, as extracted by your router, using the `uri` tags.
pub struct UriBinding;

impl Binding for UriBinding {
    fn name(&self) -> &'static str {
        "uri"
    }
}

impl<T: Bind> BindUri<T> for UriBinding {
    fn bind_uri(
        &self,
        cx: &BindContext<'_>,
        params: &FormValues,
        target: &mut T,
    ) -> Result<(), BindError> {
        map_form(target, params, "uri", cx.registry, cx.time_zone)?;
        cx.validate(target)
    }
}
