use http::{HeaderMap, Method, Uri, Version};

#[derive(Debug, Clone)]
/// All the information that is transmitted as part of an HTTP request ahead of the body.
///
/// It includes the [method](Method), the [target](Uri),
/// the [HTTP version](Version), and the [headers](HeaderMap).
/// The [`Binder`](crate::Binder) looks at the method and the `Content-Type` header
/// to pick a binding strategy, and at the target for query parameters.
pub struct RequestHead {
    /// The HTTP method of the request.
    pub method: Method,
    /// The [target](https://datatracker.ietf.org/doc/html/rfc7230#section-5.3) of the request.
    pub target: Uri,
    /// The HTTP version used by the request.
    pub version: Version,
    /// The headers attached to the request.
    pub headers: HeaderMap,
}

impl RequestHead {
    /// The raw value of the `Content-Type` header.
    ///
    /// Returns an empty string if the header is missing or isn't valid UTF-8.
    pub fn content_type(&self) -> &str {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// The parsed `Content-Type` header, if present and well-formed.
    pub fn mime(&self) -> Option<mime::Mime> {
        self.content_type().parse::<mime::Mime>().ok()
    }
}

impl From<http::request::Parts> for RequestHead {
    fn from(parts: http::request::Parts) -> Self {
        Self {
            method: parts.method,
            target: parts.uri,
            version: parts.version,
            headers: parts.headers,
        }
    }
}
