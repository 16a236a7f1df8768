use super::multipart::parse_multipart;
use super::{BindBody, BindRequest, Binding};
use crate::binder::BindContext;
use crate::errors::BindError;
use crate::field::Bind;
use crate::form_values::FormValues;
use crate::mime_types;
use crate::request::RequestHead;
use crate::walker::map_form;

#[derive(Debug, Clone, Copy, Default)]
/// Bind the query string together with the form fields of the body, using the `form` tags.
///
/// The body is read if it's `application/x-www-form-urlencoded` or `multipart/form-data`.
/// Body values come before query values under the same key.
/// Uploaded files are ignored: use [`FormMultipartBinding`](super::FormMultipartBinding)
/// to bind them.
pub struct FormBinding;

#[derive(Debug, Clone, Copy, Default)]
/// Bind the query string, using the `form` tags.
pub struct QueryBinding;

#[derive(Debug, Clone, Copy, Default)]
/// Bind the form fields of the body, using the `form` tags. The query string is ignored.
pub struct FormPostBinding;

impl Binding for FormBinding {
    fn name(&self) -> &'static str {
        "form"
    }
}

impl Binding for QueryBinding {
    fn name(&self) -> &'static str {
        "query"
    }
}

impl Binding for FormPostBinding {
    fn name(&self) -> &'static str {
        "form-urlencoded"
    }
}

/// Inject defaults, walk `values`, validate.
pub(super) fn bind_form_values<T: Bind>(
    cx: &BindContext<'_>,
    values: &FormValues,
    target: &mut T,
) -> Result<(), BindError> {
    cx.inject_defaults(target)?;
    map_form(target, values, "form", cx.registry, cx.time_zone)?;
    cx.validate(target)
}

/// The form fields carried by the body, according to its `Content-Type`.
fn body_fields(head: &RequestHead, body: &[u8]) -> Result<FormValues, BindError> {
    let Some(mime) = head.mime() else {
        return Ok(FormValues::new());
    };
    let fields = match mime.essence_str() {
        mime_types::POST_FORM => FormValues::parse(body),
        mime_types::MULTIPART_POST_FORM => parse_multipart(head.content_type(), body)?.values,
        _ => FormValues::new(),
    };
    Ok(fields)
}

impl<T: Bind> BindRequest<T> for FormBinding {
    fn bind(
        &self,
        cx: &BindContext<'_>,
        head: &RequestHead,
        body: &[u8],
        target: &mut T,
    ) -> Result<(), BindError> {
        let mut values = body_fields(head, body)?;
        values.merge(FormValues::from_query(&head.target));
        bind_form_values(cx, &values, target)
    }
}

impl<T: Bind> BindRequest<T> for QueryBinding {
    fn bind(
        &self,
        cx: &BindContext<'_>,
        head: &RequestHead,
        _body: &[u8],
        target: &mut T,
    ) -> Result<(), BindError> {
        bind_form_values(cx, &FormValues::from_query(&head.target), target)
    }
}

impl<T: Bind> BindRequest<T> for FormPostBinding {
    fn bind(
        &self,
        cx: &BindContext<'_>,
        head: &RequestHead,
        body: &[u8],
        target: &mut T,
    ) -> Result<(), BindError> {
        bind_form_values(cx, &body_fields(head, body)?, target)
    }
}

impl<T: Bind> BindBody<T> for FormPostBinding {
    /// The body is parsed as `application/x-www-form-urlencoded`.
    fn bind_body(&self, cx: &BindContext<'_>, body: &[u8], target: &mut T) -> Result<(), BindError> {
        bind_form_values(cx, &FormValues::parse(body), target)
    }
}
