use super::{BindBody, Binding, bind_request_from_body};
use crate::binder::BindContext;
use crate::errors::{BindError, ProtoBufDecodeError, SourceDecodeError};
use crate::field::Bind;

#[derive(Debug, Clone, Copy, Default)]
/// Bind a Protobuf message.
///
/// The payload is merged into the target after default injection: fields missing
/// from the payload keep their default, repeated fields are appended to.
///
/// It can't be picked by content negotiation, since it requires the target to be
/// a [`prost::Message`]. Use it with [`Binder::bind_with`](crate::Binder::bind_with)
/// or [`Binder::bind_body`](crate::Binder::bind_body).
pub struct ProtoBufBinding;

impl Binding for ProtoBufBinding {
    fn name(&self) -> &'static str {
        "protobuf"
    }
}

impl<T> BindBody<T> for ProtoBufBinding
where
    T: Bind + prost::Message,
{
    fn bind_body(&self, cx: &BindContext<'_>, body: &[u8], target: &mut T) -> Result<(), BindError> {
        cx.inject_defaults(target)?;
        target
            .merge(body)
            .map_err(|source| SourceDecodeError::from(ProtoBufDecodeError { source }))?;
        cx.validate(target)
    }
}

bind_request_from_body!(ProtoBufBinding where T: Bind + prost::Message);
