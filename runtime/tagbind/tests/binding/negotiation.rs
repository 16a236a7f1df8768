use tagbind::{Bind, Binder};

use crate::fixtures::{get, post};

#[derive(Bind, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
struct Greeting {
    #[bind(form = "name,default=stranger")]
    name: String,
}

#[test]
fn get_requests_ignore_the_content_type() {
    let head = crate::fixtures::head(
        http::Method::GET,
        "/greet?name=ada",
        Some("application/json"),
    );
    let mut greeting = Greeting::default();
    Binder::new().bind(&head, b"", &mut greeting).unwrap();
    assert_eq!(greeting.name, "ada");
}

#[test]
fn unknown_content_types_are_bound_as_forms() {
    let mut greeting = Greeting::default();
    Binder::new()
        .bind(&post("/greet?name=ada", "text/plain"), b"name=ignored", &mut greeting)
        .unwrap();
    assert_eq!(greeting.name, "ada");
}

#[test]
fn missing_inputs_fall_back_to_defaults() {
    let mut greeting = Greeting::default();
    Binder::new().bind(&get("/greet"), b"", &mut greeting).unwrap();
    assert_eq!(greeting.name, "stranger");
}

#[test]
fn multipart_text_fields_are_bound_as_forms() {
    let body = "--B\r\n\
        Content-Disposition: form-data; name=\"name\"\r\n\r\n\
        ada\r\n\
        --B--\r\n";
    let mut greeting = Greeting::default();
    Binder::new()
        .bind(
            &post("/greet", "multipart/form-data; boundary=B"),
            body.as_bytes(),
            &mut greeting,
        )
        .unwrap();
    assert_eq!(greeting.name, "ada");
}

#[test]
fn protobuf_bodies_cannot_be_negotiated() {
    let mut greeting = Greeting::default();
    let err = Binder::new()
        .bind(&post("/greet", "application/x-protobuf"), b"", &mut greeting)
        .unwrap_err();
    insta::assert_snapshot!(err, @r"
    The `protobuf` binding can't be selected through content negotiation.
    Use its adapter directly.
    ");
}
