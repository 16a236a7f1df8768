//! Errors that can occur while binding data onto a target.
use ubyte::ByteUnit;

pub use crate::validation::ValidationError;

/// A type-erased error, used as the source of conversion failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Something went wrong while binding input data onto a target.
///
/// Every variant aborts the bind operation.
/// Fields assigned before the failure are **not** rolled back.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BindError {
    #[error(transparent)]
    /// See [`ConversionError`] for details.
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    /// See [`UnsupportedKindError`] for details.
    UnsupportedKind(#[from] UnsupportedKindError),
    #[error(transparent)]
    /// See [`SourceDecodeError`] for details.
    SourceDecode(#[from] SourceDecodeError),
    #[error(transparent)]
    /// See [`ValidationError`] for details.
    Validation(#[from] ValidationError),
    #[error(transparent)]
    /// See [`SizeLimitExceeded`] for details.
    SizeLimitExceeded(#[from] SizeLimitExceeded),
    #[error(transparent)]
    /// See [`StrategyUnavailable`] for details.
    StrategyUnavailable(#[from] StrategyUnavailable),
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to convert `{raw}` into `{expected}` for the `{field}` field.\n{source}")]
#[non_exhaustive]
/// A leaf value couldn't be parsed into the type of the field it was bound to.
pub struct ConversionError {
    /// The name of the field in the target struct.
    pub field: &'static str,
    /// The raw input that failed to convert.
    pub raw: String,
    /// The name of the type we were converting into.
    pub expected: &'static str,
    #[source]
    pub source: BoxError,
}

#[derive(Debug, thiserror::Error)]
#[error(
    "The `{field}` field has type `{type_name}`, which can't be bound from text.\n\
    Register a converter for it in the binder's registry."
)]
#[non_exhaustive]
/// A field's type has no built-in conversion and no converter in the [`Registry`](crate::Registry).
pub struct UnsupportedKindError {
    /// The name of the field in the target struct.
    pub field: &'static str,
    /// The name of the field's type.
    pub type_name: &'static str,
}

/// The payload couldn't be decoded by the format-specific decoder.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SourceDecodeError {
    #[error(transparent)]
    /// See [`JsonDecodeError`] for details.
    Json(#[from] JsonDecodeError),
    #[error(transparent)]
    /// See [`XmlDecodeError`] for details.
    Xml(#[from] XmlDecodeError),
    #[error(transparent)]
    /// See [`YamlDecodeError`] for details.
    Yaml(#[from] YamlDecodeError),
    #[error(transparent)]
    /// See [`MsgPackDecodeError`] for details.
    MsgPack(#[from] MsgPackDecodeError),
    #[error(transparent)]
    /// See [`ProtoBufDecodeError`] for details.
    ProtoBuf(#[from] ProtoBufDecodeError),
    #[error(transparent)]
    /// See [`MultipartDecodeError`] for details.
    Multipart(#[from] MultipartDecodeError),
    #[error(transparent)]
    /// See [`BodyShapeError`] for details.
    Shape(#[from] BodyShapeError),
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to parse the body as a JSON document.\n{source}")]
#[non_exhaustive]
/// The body is not a valid JSON document.
pub struct JsonDecodeError {
    #[source]
    pub(crate) source: serde_json::Error,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to parse the body as an XML document.\n{source}")]
#[non_exhaustive]
/// The body is not a well-formed XML document.
pub struct XmlDecodeError {
    #[source]
    pub(crate) source: quick_xml::Error,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to parse the body as a YAML document.\n{source}")]
#[non_exhaustive]
/// The body is not a valid YAML document.
pub struct YamlDecodeError {
    #[source]
    pub(crate) source: serde_yaml::Error,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to parse the body as a MessagePack value.\n{source}")]
#[non_exhaustive]
/// The body is not a valid MessagePack value.
pub struct MsgPackDecodeError {
    #[source]
    pub(crate) source: rmpv::decode::Error,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to decode the body as a Protobuf message.\n{source}")]
#[non_exhaustive]
/// The body is not a valid encoding of the target Protobuf message.
pub struct ProtoBufDecodeError {
    #[source]
    pub(crate) source: prost::DecodeError,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to parse the body as `multipart/form-data`.\n{source}")]
#[non_exhaustive]
/// The body (or its `Content-Type` boundary) is not valid `multipart/form-data`.
pub struct MultipartDecodeError {
    #[source]
    pub(crate) source: multer::Error,
}

#[derive(Debug, thiserror::Error)]
#[error("The {format} body doesn't match the shape of the target type.\n{source}")]
#[non_exhaustive]
/// The body was syntactically valid, but it couldn't be deserialized into the target type.
pub struct BodyShapeError {
    /// The name of the format we were decoding.
    pub format: &'static str,
    #[source]
    pub(crate) source: serde_path_to_error::Error<serde_json::Error>,
}

#[derive(Debug, thiserror::Error)]
#[error("The request body is larger than the maximum size limit enforced by this binder.")]
#[non_exhaustive]
/// The request body is larger than the maximum size limit enforced by the [`Binder`](crate::Binder).
pub struct SizeLimitExceeded {
    /// The maximum size limit enforced by the binder.
    pub max_size: ByteUnit,
    /// The size of the body that breached the limit, in bytes.
    pub actual: usize,
}

#[derive(Debug, thiserror::Error)]
#[error(
    "The `{strategy}` binding can't be selected through content negotiation.\n\
    Use its adapter directly."
)]
#[non_exhaustive]
/// Content negotiation picked a strategy that needs extra bounds on the target type.
pub struct StrategyUnavailable {
    /// The name of the negotiated strategy.
    pub strategy: &'static str,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to convert the input into `{expected}`.\n{source}")]
#[non_exhaustive]
/// The error returned by a converter stored in the [`Registry`](crate::Registry).
pub struct ConverterError {
    /// The name of the type the converter produces.
    pub expected: &'static str,
    #[source]
    pub source: BoxError,
}

/// A value couldn't be scanned into a [nullable](crate::nullable) type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ScanError {
    #[error("Can't scan a {found} value into `{expected}`.")]
    /// The value has a kind that can never be converted into the target type.
    Incompatible {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Can't scan `{raw}` into `{expected}`: {reason}")]
    /// The value is text that doesn't parse as the target type.
    Parse {
        expected: &'static str,
        raw: String,
        reason: String,
    },
    #[error("`{raw}` is out of range for `{expected}`.")]
    /// The value is numeric, but it doesn't fit into the target type.
    OutOfRange { expected: &'static str, raw: String },
}
