//! Decode self-describing bodies without losing injected defaults.
//!
//! The target is serialized after default injection, the decoded body is laid
//! over it, and the result is deserialized back into the target. Keys that are
//! absent from the body keep the value they had before decoding.
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use crate::binder::BindContext;
use crate::errors::{BindError, BodyShapeError, SourceDecodeError};
use crate::field::Bind;

use super::text_tree::TextTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Leaves {
    /// Leaves carry their own type.
    Typed,
    /// Leaves are text, parsed against the type the target expects.
    Text,
}

/// Inject defaults, lay `decode`'s output over `target`, deserialize, validate.
pub(super) fn bind_overlay<T, F>(
    cx: &BindContext<'_>,
    format: &'static str,
    leaves: Leaves,
    decode: F,
    target: &mut T,
) -> Result<(), BindError>
where
    T: Bind + Serialize + DeserializeOwned,
    F: FnOnce() -> Result<Json, SourceDecodeError>,
{
    cx.inject_defaults(target)?;
    let incoming = decode()?;

    let mut merged = match serde_json::to_value(&*target) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::debug!(
                error.msg = %e,
                error.details = ?e,
                "The target can't be represented as a JSON tree, decoding without defaults"
            );
            Json::Null
        }
    };
    // A `null` document leaves the target untouched.
    if !incoming.is_null() {
        overlay(&mut merged, incoming, leaves);
    }

    let decoded: T = match leaves {
        Leaves::Typed => serde_path_to_error::deserialize(merged),
        Leaves::Text => serde_path_to_error::deserialize(TextTree(merged)),
    }
    .map_err(|source| SourceDecodeError::from(BodyShapeError { format, source }))?;
    *target = decoded;
    cx.validate(target)
}

fn overlay(seed: &mut Json, incoming: Json, leaves: Leaves) {
    match (seed, incoming) {
        (Json::Object(seed), Json::Object(incoming)) => {
            for (key, value) in incoming {
                match seed.get_mut(&key) {
                    Some(slot) => overlay(slot, value, leaves),
                    None => {
                        seed.insert(key, value);
                    }
                }
            }
        }
        // An empty element says nothing about the fields of a nested struct.
        (Json::Object(_), Json::String(text)) if leaves == Leaves::Text && text.is_empty() => {}
        (seed, incoming) => *seed = incoming,
    }
}

/// Collapse an element's children into a JSON object, turning repeated keys into arrays.
pub(super) fn insert_repeated(map: &mut Map<String, Json>, key: String, value: Json) {
    match map.get_mut(&key) {
        Some(Json::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Json::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}
