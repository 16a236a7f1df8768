//! MIME types understood by the binding strategies, and the file extensions
//! associated with common upload types.
pub const JSON: &str = "application/json";
pub const HTML: &str = "text/html";
pub const XML: &str = "application/xml";
pub const XML2: &str = "text/xml";
pub const PLAIN: &str = "text/plain";
pub const POST_FORM: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_POST_FORM: &str = "multipart/form-data";
pub const PROTOBUF: &str = "application/x-protobuf";
pub const MSGPACK: &str = "application/x-msgpack";
pub const MSGPACK2: &str = "application/msgpack";
pub const YAML: &str = "application/x-yaml";
pub const JPEG: &str = "image/jpeg";
pub const GIF: &str = "image/gif";
pub const PNG: &str = "image/png";
pub const DOC: &str = "application/msword";
pub const PDF: &str = "application/pdf";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS: &str = "application/vnd.ms-excel";
pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const SEVEN_ZIP: &str = "application/x-7z-compressed";
pub const RAR: &str = "application/x-rar-compressed";
pub const ZIP: &str = "application/zip";

const EXTENSIONS: &[(&str, &str)] = &[
    (JSON, ".json"),
    (HTML, ".html"),
    (XML, ".xml"),
    (XML2, ".xml"),
    (YAML, ".yaml"),
    (JPEG, ".jpg"),
    (GIF, ".gif"),
    (PNG, ".png"),
    (PDF, ".pdf"),
    (SEVEN_ZIP, ".7z"),
    (RAR, ".rar"),
    (DOC, ".doc"),
    (DOCX, ".docx"),
    (PPTX, ".pptx"),
    (XLSX, ".xlsx"),
    (XLS, ".xls"),
    (ZIP, ".zip"),
];

/// The file extension, leading dot included, for a MIME type.
///
/// Parameters (e.g. `; charset=utf-8`) are ignored, and so is input that isn't a MIME type.
///
/// ```rust
/// use tagbind::mime_types::extension;
///
/// assert_eq!(extension("image/png"), Some(".png"));
/// assert_eq!(extension("text/xml; charset=utf-8"), Some(".xml"));
/// assert_eq!(extension("video/mp4"), None);
/// ```
pub fn extension(mime_type: &str) -> Option<&'static str> {
    let mime_type: mime::Mime = mime_type.trim().parse().ok()?;
    let essence = mime_type.essence_str();
    EXTENSIONS
        .iter()
        .find_map(|(known, ext)| (*known == essence).then_some(*ext))
}
