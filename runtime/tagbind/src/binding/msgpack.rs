use rmpv::Value as MsgPack;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value as Json};

use super::overlay::{Leaves, bind_overlay};
use super::{BindBody, Binding, bind_request_from_body};
use crate::binder::BindContext;
use crate::errors::{BindError, MsgPackDecodeError};
use crate::field::Bind;

#[derive(Debug, Clone, Copy, Default)]
/// Bind a MessagePack value.
///
/// Maps with non-string keys are accepted: keys are rendered as text.
/// Binary and extension payloads are presented as arrays of bytes.
pub struct MsgPackBinding;

impl Binding for MsgPackBinding {
    fn name(&self) -> &'static str {
        "msgpack"
    }
}

impl<T> BindBody<T> for MsgPackBinding
where
    T: Bind + Serialize + DeserializeOwned,
{
    fn bind_body(&self, cx: &BindContext<'_>, body: &[u8], target: &mut T) -> Result<(), BindError> {
        bind_overlay(
            cx,
            self.name(),
            Leaves::Typed,
            || {
                let mut reader = body;
                let value = rmpv::decode::read_value(&mut reader)
                    .map_err(|source| MsgPackDecodeError { source })?;
                Ok(to_json(value))
            },
            target,
        )
    }
}

bind_request_from_body!(MsgPackBinding where T: Bind + Serialize + DeserializeOwned);

fn bytes(bytes: Vec<u8>) -> Json {
    Json::Array(bytes.into_iter().map(Json::from).collect())
}

fn to_json(value: MsgPack) -> Json {
    match value {
        MsgPack::Nil => Json::Null,
        MsgPack::Boolean(b) => Json::Bool(b),
        MsgPack::Integer(i) => {
            if let Some(i) = i.as_i64() {
                Json::Number(i.into())
            } else if let Some(u) = i.as_u64() {
                Json::Number(u.into())
            } else {
                Json::Null
            }
        }
        MsgPack::F32(f) => Number::from_f64(f64::from(f)).map_or(Json::Null, Json::Number),
        MsgPack::F64(f) => Number::from_f64(f).map_or(Json::Null, Json::Number),
        MsgPack::String(s) => match s.into_str() {
            Some(s) => Json::String(s),
            None => Json::Null,
        },
        MsgPack::Binary(b) | MsgPack::Ext(_, b) => bytes(b),
        MsgPack::Array(items) => Json::Array(items.into_iter().map(to_json).collect()),
        MsgPack::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, value) in entries {
                let key = match key {
                    MsgPack::String(s) => s.into_str().unwrap_or_default(),
                    other => other.to_string(),
                };
                map.insert(key, to_json(value));
            }
            Json::Object(map)
        }
    }
}
