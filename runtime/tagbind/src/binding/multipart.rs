use std::convert::Infallible;

use bytes::Bytes;
use indexmap::IndexMap;

use super::form::bind_form_values;
use super::{BindRequest, Binding};
use crate::binder::BindContext;
use crate::errors::{BindError, MultipartDecodeError, SourceDecodeError};
use crate::field::Bind;
use crate::form_values::FormValues;
use crate::request::RequestHead;
use crate::upload::FileHeader;
use crate::walker::map_files;

#[derive(Debug, Clone, Copy, Default)]
/// Bind a `multipart/form-data` body, using the `form` tags.
///
/// Text parts are bound like url-encoded fields. Parts with a file name are assigned
/// to the [`File`](crate::upload::File) and [`Files`](crate::upload::Files) fields
/// whose binding name matches the part name.
pub struct FormMultipartBinding;

impl Binding for FormMultipartBinding {
    fn name(&self) -> &'static str {
        "multipart/form-data"
    }
}

impl<T: Bind> BindRequest<T> for FormMultipartBinding {
    fn bind(
        &self,
        cx: &BindContext<'_>,
        head: &RequestHead,
        body: &[u8],
        target: &mut T,
    ) -> Result<(), BindError> {
        let form = parse_multipart(head.content_type(), body)?;
        map_files(target, &form.files)?;
        bind_form_values(cx, &form.values, target)
    }
}

/// The parts of a `multipart/form-data` body.
pub(super) struct MultipartForm {
    pub(super) values: FormValues,
    pub(super) files: IndexMap<String, Vec<FileHeader>>,
}

pub(super) fn parse_multipart(content_type: &str, body: &[u8]) -> Result<MultipartForm, BindError> {
    let decode_error =
        |source: multer::Error| SourceDecodeError::from(MultipartDecodeError { source });

    let boundary = multer::parse_boundary(content_type).map_err(decode_error)?;
    let body = Bytes::copy_from_slice(body);
    let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    // The whole body is already in memory: polling never has to wait.
    let form = futures::executor::block_on(async {
        let mut form = MultipartForm {
            values: FormValues::new(),
            files: IndexMap::new(),
        };
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().cloned();
            let headers = field.headers().clone();
            let bytes = field.bytes().await?;
            match file_name {
                Some(file_name) => form.files.entry(name.clone()).or_default().push(FileHeader {
                    field_name: name,
                    file_name: Some(file_name),
                    content_type,
                    headers,
                    bytes,
                }),
                None => form.values.append(name, String::from_utf8_lossy(&bytes)),
            }
        }
        Ok::<_, multer::Error>(form)
    })
    .map_err(decode_error)?;

    tracing::trace!(
        fields = form.values.len(),
        files = form.files.len(),
        "Parsed multipart body"
    );
    Ok(form)
}
