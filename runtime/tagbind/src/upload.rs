//! Files uploaded through `multipart/form-data` bodies.
//!
//! Fields typed as [`File`] or [`Files`] are skipped by the form walker and
//! assigned by [`FormMultipartBinding`](crate::binding::FormMultipartBinding)
//! from the parts whose name matches the field's `form` tag.
//! Storing the files is up to you.
use std::any::Any;

use bytes::Bytes;
use http::HeaderMap;
use mime::Mime;

use crate::field::{BindField, FileField, Slot};
use crate::mime_types;

#[derive(Debug, Clone)]
/// A file part of a multipart body.
pub struct FileHeader {
    /// The name of the form field the file was submitted under.
    pub field_name: String,
    /// The file name reported by the client, if any.
    pub file_name: Option<String>,
    /// The `Content-Type` of the part, if any.
    pub content_type: Option<Mime>,
    /// All the headers of the part.
    pub headers: HeaderMap,
    /// The file contents.
    pub bytes: Bytes,
}

impl FileHeader {
    /// The size of the file, in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn essence(&self) -> Option<&str> {
        self.content_type.as_ref().map(Mime::essence_str)
    }

    fn has_type(&self, accepted: &[&str]) -> bool {
        self.essence().is_some_and(|essence| accepted.contains(&essence))
    }
}

#[derive(Debug, Clone, Default)]
/// A single uploaded file, if one was submitted.
pub struct File(pub Option<FileHeader>);

impl File {
    pub fn header(&self) -> Option<&FileHeader> {
        self.0.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// `true` for GIF, PNG and JPEG files.
    pub fn is_image(&self) -> bool {
        self.0
            .as_ref()
            .is_some_and(|h| h.has_type(&[mime_types::GIF, mime_types::PNG, mime_types::JPEG]))
    }

    /// `true` for Word and PDF documents.
    pub fn is_doc(&self) -> bool {
        self.0
            .as_ref()
            .is_some_and(|h| h.has_type(&[mime_types::DOC, mime_types::DOCX, mime_types::PDF]))
    }

    /// `true` for RAR and 7z archives.
    pub fn is_archive(&self) -> bool {
        self.0
            .as_ref()
            .is_some_and(|h| h.has_type(&[mime_types::SEVEN_ZIP, mime_types::RAR]))
    }

    /// The extension matching the file's content type, leading dot included.
    pub fn extension(&self) -> Option<&'static str> {
        mime_types::extension(self.0.as_ref()?.essence()?)
    }
}

impl FileField for File {
    fn set_files(&mut self, files: Vec<FileHeader>) {
        self.0 = files.into_iter().next();
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl BindField for File {
    fn slot(&mut self) -> Slot<'_> {
        Slot::File(self)
    }
}

#[derive(Debug, Clone, Default)]
/// Every file uploaded under the same field name.
pub struct Files(pub Vec<File>);

impl Files {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The combined size of the files, in bytes.
    pub fn size(&self) -> usize {
        self.0
            .iter()
            .filter_map(File::header)
            .map(FileHeader::size)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &File> {
        self.0.iter()
    }
}

impl FileField for Files {
    fn set_files(&mut self, files: Vec<FileHeader>) {
        self.0 = files.into_iter().map(|h| File(Some(h))).collect();
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl BindField for Files {
    fn slot(&mut self) -> Slot<'_> {
        Slot::File(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{File, FileHeader, Files};

    fn header(content_type: &str, bytes: &'static [u8]) -> FileHeader {
        FileHeader {
            field_name: "upload".into(),
            file_name: Some("upload.bin".into()),
            content_type: Some(content_type.parse().unwrap()),
            headers: http::HeaderMap::new(),
            bytes: bytes::Bytes::from_static(bytes),
        }
    }

    #[test]
    fn classifies_by_content_type() {
        let png = File(Some(header("image/png", b"png")));
        assert!(png.is_image());
        assert!(!png.is_doc());
        assert_eq!(png.extension(), Some(".png"));

        let pdf = File(Some(header("application/pdf", b"%PDF")));
        assert!(pdf.is_doc());

        let rar = File(Some(header("application/x-rar-compressed", b"rar")));
        assert!(rar.is_archive());

        let missing = File::default();
        assert!(!missing.is_image());
        assert_eq!(missing.extension(), None);
    }

    #[test]
    fn files_report_their_combined_size() {
        let files = Files(vec![
            File(Some(header("image/gif", b"abc"))),
            File(Some(header("image/gif", b"de"))),
        ]);
        assert_eq!(files.len(), 2);
        assert_eq!(files.size(), 5);
    }
}
