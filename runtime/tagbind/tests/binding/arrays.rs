use indexmap::IndexMap;
use tagbind::binding::ArrayBinding;
use tagbind::errors::BindError;
use tagbind::nullable::NullFloat64;
use tagbind::{Bind, Binder, Value};

#[derive(Bind, Debug, Default)]
struct Row {
    #[bind(array = "id")]
    id: i64,
    // Untagged fields are looked up by their name.
    name: String,
    #[bind(array = "-")]
    secret: String,
    #[bind(array = "score")]
    score: NullFloat64,
    #[bind(array = "tags")]
    tags: Vec<String>,
    #[bind(array = "limit,default=10")]
    limit: u32,
}

fn source<const N: usize>(entries: [(&str, Value); N]) -> IndexMap<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

#[test]
fn dynamic_values_are_widened_into_the_field_types() {
    let source = source([
        ("id", Value::Float(5.0)),
        ("name", Value::Text("ada".into())),
        ("secret", Value::Text("leaked".into())),
        ("score", Value::Null),
        (
            "tags",
            Value::List(vec![Value::Text("a".into()), Value::Text("b".into())]),
        ),
    ]);
    let mut row = Row::default();
    Binder::new()
        .bind_array(&ArrayBinding, &source, &mut row)
        .unwrap();

    assert_eq!(row.id, 5);
    assert_eq!(row.name, "ada");
    assert_eq!(row.secret, "");
    assert_eq!(row.score, NullFloat64::null());
    assert_eq!(row.tags, vec!["a", "b"]);
    assert_eq!(row.limit, 10);
}

#[test]
fn text_is_parsed_and_garbage_is_rejected() {
    let binder = Binder::new();

    let mut row = Row::default();
    binder
        .bind_array(&ArrayBinding, &source([("id", Value::Text("7".into()))]), &mut row)
        .unwrap();
    assert_eq!(row.id, 7);

    let err = binder
        .bind_array(&ArrayBinding, &source([("id", Value::Text("seven".into()))]), &mut row)
        .unwrap_err();
    let BindError::Conversion(e) = &err else {
        panic!("Expected a conversion error, got {err:?}");
    };
    assert_eq!(e.field, "id");
    assert_eq!(e.raw, "seven");
}
