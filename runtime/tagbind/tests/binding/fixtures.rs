use tagbind::request::RequestHead;

/// The head of a request, with an optional `Content-Type` header.
pub fn head(method: http::Method, uri: &str, content_type: Option<&str>) -> RequestHead {
    let mut builder = http::Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(http::header::CONTENT_TYPE, content_type);
    }
    let (parts, _) = builder.body(()).unwrap().into_parts();
    RequestHead::from(parts)
}

pub fn post(uri: &str, content_type: &str) -> RequestHead {
    head(http::Method::POST, uri, Some(content_type))
}

pub fn get(uri: &str) -> RequestHead {
    head(http::Method::GET, uri, None)
}
