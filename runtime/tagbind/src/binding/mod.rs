//! One adapter per wire format.
//!
//! Every adapter is a unit struct implementing [`Binding`] plus the narrow traits
//! for the inputs it understands:
//!
//! | Adapter                  | Name                  | Traits                           |
//! |--------------------------|-----------------------|----------------------------------|
//! | [`JsonBinding`]          | `json`                | [`BindRequest`], [`BindBody`]    |
//! | [`XmlBinding`]           | `xml`                 | [`BindRequest`], [`BindBody`]    |
//! | [`YamlBinding`]          | `yaml`                | [`BindRequest`], [`BindBody`]    |
//! | [`MsgPackBinding`]       | `msgpack`             | [`BindRequest`], [`BindBody`]    |
//! | [`ProtoBufBinding`]      | `protobuf`            | [`BindRequest`], [`BindBody`]    |
//! | [`FormBinding`]          | `form`                | [`BindRequest`]                  |
//! | [`QueryBinding`]         | `query`               | [`BindRequest`]                  |
//! | [`FormPostBinding`]      | `form-urlencoded`     | [`BindRequest`], [`BindBody`]    |
//! | [`FormMultipartBinding`] | `multipart/form-data` | [`BindRequest`]                  |
//! | [`UriBinding`]           | `uri`                 | [`BindUri`]                      |
//! | [`ArrayBinding`]         | `array`               | [`BindArray`]                    |
//!
//! Adapters for self-describing bodies and for forms inject the defaults declared
//! on the target's `form` tags before decoding. Every adapter hands the target to the
//! [validator](crate::validation) once decoding succeeded.
use http::Method;
use indexmap::IndexMap;

use crate::binder::BindContext;
use crate::errors::BindError;
use crate::form_values::FormValues;
use crate::mime_types;
use crate::request::RequestHead;
use crate::value::Value;

pub use array::ArrayBinding;
pub use form::{FormBinding, FormPostBinding, QueryBinding};
pub use json::JsonBinding;
pub use msgpack::MsgPackBinding;
pub use multipart::FormMultipartBinding;
pub use protobuf::ProtoBufBinding;
pub use uri::UriBinding;
pub use xml::XmlBinding;
pub use yaml::YamlBinding;

/// Implement [`BindRequest`] for an adapter that only looks at the body.
macro_rules! bind_request_from_body {
    ($binding:ty where T: $($bounds:tt)+) => {
        impl<T> $crate::binding::BindRequest<T> for $binding
        where
            T: $($bounds)+,
        {
            fn bind(
                &self,
                cx: &$crate::BindContext<'_>,
                _head: &$crate::request::RequestHead,
                body: &[u8],
                target: &mut T,
            ) -> Result<(), $crate::errors::BindError> {
                $crate::binding::BindBody::bind_body(self, cx, body, target)
            }
        }
    };
}
pub(crate) use bind_request_from_body;

mod array;
mod form;
mod json;
mod msgpack;
mod multipart;
mod overlay;
mod protobuf;
mod text_tree;
mod uri;
mod xml;
mod yaml;

/// A named binding strategy.
pub trait Binding {
    /// The name of the strategy, used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Bind the data carried by an HTTP request onto `T`.
pub trait BindRequest<T>: Binding {
    fn bind(
        &self,
        cx: &BindContext<'_>,
        head: &RequestHead,
        body: &[u8],
        target: &mut T,
    ) -> Result<(), BindError>;
}

/// Bind a raw payload onto `T`.
pub trait BindBody<T>: Binding {
    fn bind_body(&self, cx: &BindContext<'_>, body: &[u8], target: &mut T) -> Result<(), BindError>;
}

/// Bind path parameters onto `T`.
pub trait BindUri<T>: Binding {
    fn bind_uri(
        &self,
        cx: &BindContext<'_>,
        params: &FormValues,
        target: &mut T,
    ) -> Result<(), BindError>;
}

/// Bind a map of dynamic values onto `T`.
pub trait BindArray<T>: Binding {
    fn bind_array(
        &self,
        cx: &BindContext<'_>,
        source: &IndexMap<String, Value>,
        target: &mut T,
    ) -> Result<(), BindError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Every binding strategy.
pub enum Strategy {
    Json,
    Xml,
    Form,
    Query,
    FormPost,
    FormMultipart,
    ProtoBuf,
    MsgPack,
    Yaml,
    Uri,
    Array,
}

impl Strategy {
    /// Pick a strategy for a request, given its method and its `Content-Type` header.
    ///
    /// `GET` requests are always bound as forms. Otherwise the MIME type of the body
    /// decides, ignoring parameters such as `charset`. Unknown, missing or malformed
    /// content types fall back to [`Strategy::Form`].
    ///
    /// ```rust
    /// use http::Method;
    /// use tagbind::binding::Strategy;
    ///
    /// assert_eq!(Strategy::negotiate(&Method::GET, "application/json"), Strategy::Form);
    /// assert_eq!(Strategy::negotiate(&Method::POST, "application/json"), Strategy::Json);
    /// assert_eq!(Strategy::negotiate(&Method::POST, "text/unknown"), Strategy::Form);
    /// ```
    pub fn negotiate(method: &Method, content_type: &str) -> Self {
        if *method == Method::GET {
            return Strategy::Form;
        }
        let Ok(mime) = content_type.parse::<mime::Mime>() else {
            return Strategy::Form;
        };
        let essence = mime.essence_str().to_ascii_lowercase();
        match essence.as_str() {
            mime_types::JSON => Strategy::Json,
            mime_types::XML | mime_types::XML2 => Strategy::Xml,
            mime_types::PROTOBUF => Strategy::ProtoBuf,
            mime_types::MSGPACK | mime_types::MSGPACK2 => Strategy::MsgPack,
            mime_types::YAML => Strategy::Yaml,
            _ => Strategy::Form,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Json => JsonBinding.name(),
            Strategy::Xml => XmlBinding.name(),
            Strategy::Form => FormBinding.name(),
            Strategy::Query => QueryBinding.name(),
            Strategy::FormPost => FormPostBinding.name(),
            Strategy::FormMultipart => FormMultipartBinding.name(),
            Strategy::ProtoBuf => ProtoBufBinding.name(),
            Strategy::MsgPack => MsgPackBinding.name(),
            Strategy::Yaml => YamlBinding.name(),
            Strategy::Uri => UriBinding.name(),
            Strategy::Array => ArrayBinding.name(),
        }
    }
}
