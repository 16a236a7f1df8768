use tagbind::binding::FormMultipartBinding;
use tagbind::errors::{BindError, SourceDecodeError};
use tagbind::upload::{File, Files};
use tagbind::{Bind, Binder};

use crate::fixtures::post;

#[derive(Bind, Debug, Default)]
struct Album {
    #[bind(form = "title")]
    title: String,
    #[bind(form = "visibility,default=private")]
    visibility: String,
    #[bind(form = "cover")]
    cover: File,
    #[bind(form = "photos")]
    photos: Files,
    #[bind(form = "notes")]
    notes: File,
}

const BODY: &str = "--BOUNDARY\r\n\
    Content-Disposition: form-data; name=\"title\"\r\n\r\n\
    Summer\r\n\
    --BOUNDARY\r\n\
    Content-Disposition: form-data; name=\"cover\"; filename=\"cover.png\"\r\n\
    Content-Type: image/png\r\n\r\n\
    PNG!\r\n\
    --BOUNDARY\r\n\
    Content-Disposition: form-data; name=\"photos\"; filename=\"one.jpg\"\r\n\
    Content-Type: image/jpeg\r\n\r\n\
    first\r\n\
    --BOUNDARY\r\n\
    Content-Disposition: form-data; name=\"photos\"; filename=\"two.jpg\"\r\n\
    Content-Type: image/jpeg\r\n\r\n\
    second\r\n\
    --BOUNDARY--\r\n";

#[test]
fn text_parts_and_files_are_bound_together() {
    let head = post("/albums", "multipart/form-data; boundary=BOUNDARY");
    let mut album = Album::default();
    Binder::new()
        .bind_with(&FormMultipartBinding, &head, BODY.as_bytes(), &mut album)
        .unwrap();

    assert_eq!(album.title, "Summer");
    assert_eq!(album.visibility, "private");

    assert!(album.cover.is_image());
    assert_eq!(album.cover.extension(), Some(".png"));
    let cover = album.cover.header().unwrap();
    assert_eq!(cover.file_name.as_deref(), Some("cover.png"));
    assert_eq!(cover.size(), 4);

    assert_eq!(album.photos.len(), 2);
    assert_eq!(album.photos.size(), "first".len() + "second".len());
    assert!(album.photos.iter().all(File::is_image));

    assert!(!album.notes.is_present());
}

#[test]
fn bodies_without_a_boundary_are_rejected() {
    let head = post("/albums", "multipart/form-data");
    let mut album = Album::default();
    let err = Binder::new()
        .bind_with(&FormMultipartBinding, &head, BODY.as_bytes(), &mut album)
        .unwrap_err();
    assert!(matches!(
        err,
        BindError::SourceDecode(SourceDecodeError::Multipart(_))
    ));
}
