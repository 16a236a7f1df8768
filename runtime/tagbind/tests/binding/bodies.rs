use serde_json::json;
use tagbind::binding::{JsonBinding, XmlBinding, YamlBinding};
use tagbind::errors::{BindError, SourceDecodeError};
use tagbind::nullable::{NullInt32s, NullInt64, NullString};
use tagbind::validation::{ValidationError, Validators};
use tagbind::{Bind, Binder};
use ubyte::ToByteUnit;

use crate::fixtures::post;

#[derive(Bind, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Listing {
    #[bind(form = "name")]
    pub name: String,
    #[bind(form = "page,default=1")]
    pub page: u32,
    #[bind(form = "per_page,default=20")]
    pub per_page: u32,
}

fn bind(content_type: &str, body: &[u8]) -> Result<Listing, BindError> {
    let mut listing = Listing::default();
    Binder::new().bind(&post("/listings", content_type), body, &mut listing)?;
    Ok(listing)
}

#[test]
fn json_bodies_keep_defaults_for_absent_keys() {
    let listing = bind("application/json", br#"{"name": "ada", "per_page": 50}"#).unwrap();
    assert_eq!(
        listing,
        Listing {
            name: "ada".into(),
            page: 1,
            per_page: 50,
        }
    );
}

#[test]
fn a_null_json_document_only_injects_defaults() {
    let listing = bind("application/json; charset=utf-8", b"null").unwrap();
    assert_eq!(listing.page, 1);
    assert_eq!(listing.name, "");
}

#[test]
fn xml_text_is_converted_to_the_field_types() {
    let body = br#"<?xml version="1.0"?>
        <listing>
            <name>ada</name>
            <page>3</page>
        </listing>"#;
    let listing = bind("application/xml", body).unwrap();
    assert_eq!(listing.name, "ada");
    assert_eq!(listing.page, 3);
    assert_eq!(listing.per_page, 20);
}

#[derive(Bind, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
struct Order {
    #[bind(form = "ids")]
    ids: Vec<u32>,
    #[bind(form = "qty")]
    qty: Option<u32>,
    #[bind(form = "codes")]
    codes: NullInt32s,
}

fn bind_xml(body: &[u8]) -> Result<Order, BindError> {
    let mut order = Order::default();
    Binder::new().bind_body(&XmlBinding, body, &mut order)?;
    Ok(order)
}

#[test]
fn repeated_xml_elements_fill_lists() {
    let order = bind_xml(b"<order><ids>1</ids><ids>2</ids></order>").unwrap();
    assert_eq!(order.ids, vec![1, 2]);
    assert_eq!(order.qty, None);
    assert_eq!(order.codes, NullInt32s::null());
}

#[test]
fn xml_text_fills_unset_options() {
    let order = bind_xml(b"<order><qty>5</qty></order>").unwrap();
    assert_eq!(order.qty, Some(5));
    assert!(order.ids.is_empty());
}

#[test]
fn a_lone_xml_element_is_a_list_of_one() {
    let order = bind_xml(b"<order><ids>5</ids><codes>7</codes></order>").unwrap();
    assert_eq!(order.ids, vec![5]);
    assert_eq!(order.codes, NullInt32s::new(vec![7]));
}

#[test]
fn yaml_bodies_keep_defaults_for_absent_keys() {
    let mut listing = Listing::default();
    Binder::new()
        .bind_body(&YamlBinding, b"name: ada\nper_page: 50\n", &mut listing)
        .unwrap();
    assert_eq!(listing.page, 1);
    assert_eq!(listing.per_page, 50);
}

#[test]
fn msgpack_bodies_are_bound_like_json() {
    let document = rmpv::Value::Map(vec![
        (rmpv::Value::from("name"), rmpv::Value::from("ada")),
        (rmpv::Value::from("page"), rmpv::Value::from(2)),
    ]);
    let mut body = Vec::new();
    rmpv::encode::write_value(&mut body, &document).unwrap();

    let listing = bind("application/x-msgpack", &body).unwrap();
    assert_eq!(listing.name, "ada");
    assert_eq!(listing.page, 2);
    assert_eq!(listing.per_page, 20);
}

#[test]
fn malformed_json_is_a_decode_error() {
    let err = bind("application/json", br#"{"name": "#).unwrap_err();
    assert!(matches!(
        err,
        BindError::SourceDecode(SourceDecodeError::Json(_))
    ));
}

#[derive(Bind, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
struct Patient {
    #[bind(form = "age")]
    age: NullInt64,
    #[bind(form = "nickname")]
    nickname: NullString,
}

#[test]
fn nullable_fields_round_trip_through_json() {
    let binder = Binder::new();
    let head = post("/patients", "application/json");

    let mut patient = Patient::default();
    binder
        .bind(&head, br#"{"age": null, "nickname": "Bo"}"#, &mut patient)
        .unwrap();
    assert_eq!(patient.age, NullInt64::null());
    assert_eq!(patient.nickname, NullString::new("Bo".into()));
    assert_eq!(
        serde_json::to_value(&patient).unwrap(),
        json!({"age": null, "nickname": "Bo"})
    );

    binder.bind(&head, br#"{"age": 41}"#, &mut patient).unwrap();
    assert_eq!(patient.age, NullInt64::new(41));
    // Absent keys keep their current value.
    assert_eq!(patient.nickname, NullString::new("Bo".into()));
}

#[derive(Bind, Debug, Default, serde::Serialize, serde::Deserialize)]
struct Scores {
    #[bind(form = "strict")]
    strict: Vec<i32>,
    #[bind(form = "lenient")]
    lenient: NullInt32s,
}

#[test]
fn plain_lists_are_strict_and_nullable_lists_are_lenient() {
    let binder = Binder::new();

    let mut scores = Scores::default();
    binder
        .bind_body(&JsonBinding, br#"{"lenient": [1, "x", 3]}"#, &mut scores)
        .unwrap();
    assert_eq!(scores.lenient, NullInt32s::new(vec![1, 3]));

    let err = binder
        .bind_body(&JsonBinding, br#"{"strict": [1, "x"]}"#, &mut scores)
        .unwrap_err();
    assert!(matches!(
        err,
        BindError::SourceDecode(SourceDecodeError::Shape(_))
    ));
}

#[test]
fn oversized_bodies_are_rejected_before_decoding() {
    let mut listing = Listing::default();
    let err = Binder::new()
        .with_max_body_size(8.bytes())
        .bind_body(&JsonBinding, br#"{"name": "a long name"}"#, &mut listing)
        .unwrap_err();

    let BindError::SizeLimitExceeded(e) = &err else {
        panic!("Expected a size limit error, got {err:?}");
    };
    assert_eq!(e.max_size, 8.bytes());
    assert_eq!(e.actual, 23);
    // Nothing was decoded, not even the defaults.
    assert_eq!(listing, Listing::default());
}

#[test]
fn bound_targets_are_validated() {
    let validators = Validators::new();
    validators.register(|listing: &Listing| {
        if listing.per_page > 100 {
            return Err(ValidationError::single("per_page", "must be at most 100"));
        }
        Ok(())
    });
    let binder = Binder::new().with_validator(validators);

    let mut listing = Listing::default();
    let err = binder
        .bind_body(&JsonBinding, br#"{"per_page": 500}"#, &mut listing)
        .unwrap_err();
    insta::assert_snapshot!(err, @r"
    The bound data is invalid.
    - `per_page`: must be at most 100
    ");

    binder
        .bind_body(&JsonBinding, br#"{"per_page": 50}"#, &mut listing)
        .unwrap();
}
