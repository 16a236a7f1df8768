use serde::Serialize;
use serde::de::DeserializeOwned;

use super::overlay::{Leaves, bind_overlay};
use super::{BindBody, Binding, bind_request_from_body};
use crate::binder::BindContext;
use crate::errors::{BindError, JsonDecodeError};
use crate::field::Bind;

#[derive(Debug, Clone, Copy, Default)]
/// Bind a JSON document.
///
/// Keys missing from the document keep their default. `null` replaces the value of
/// the field it's assigned to.
pub struct JsonBinding;

impl Binding for JsonBinding {
    fn name(&self) -> &'static str {
        "json"
    }
}

impl<T> BindBody<T> for JsonBinding
where
    T: Bind + Serialize + DeserializeOwned,
{
    fn bind_body(&self, cx: &BindContext<'_>, body: &[u8], target: &mut T) -> Result<(), BindError> {
        bind_overlay(
            cx,
            self.name(),
            Leaves::Typed,
            || serde_json::from_slice(body).map_err(|source| JsonDecodeError { source }.into()),
            target,
        )
    }
}

bind_request_from_body!(JsonBinding where T: Bind + Serialize + DeserializeOwned);
