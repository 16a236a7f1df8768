use serde::Serialize;
use serde::de::DeserializeOwned;

use super::overlay::{Leaves, bind_overlay};
use super::{BindBody, Binding, bind_request_from_body};
use crate::binder::BindContext;
use crate::errors::{BindError, YamlDecodeError};
use crate::field::Bind;

#[derive(Debug, Clone, Copy, Default)]
/// Bind a YAML document.
///
/// An empty document leaves the target with its defaults.
pub struct YamlBinding;

impl Binding for YamlBinding {
    fn name(&self) -> &'static str {
        "yaml"
    }
}

impl<T> BindBody<T> for YamlBinding
where
    T: Bind + Serialize + DeserializeOwned,
{
    fn bind_body(&self, cx: &BindContext<'_>, body: &[u8], target: &mut T) -> Result<(), BindError> {
        bind_overlay(
            cx,
            self.name(),
            Leaves::Typed,
            || serde_yaml::from_slice(body).map_err(|source| YamlDecodeError { source }.into()),
            target,
        )
    }
}

bind_request_from_body!(YamlBinding where T: Bind + Serialize + DeserializeOwned);
