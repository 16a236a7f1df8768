use prost::Message;
use tagbind::binding::ProtoBufBinding;
use tagbind::errors::{BindError, SourceDecodeError};
use tagbind::{Bind, Binder};

use crate::fixtures::post;

#[derive(Clone, PartialEq, prost::Message, Bind)]
pub struct Greeting {
    #[prost(string, tag = "1")]
    #[bind(form = "name,default=stranger")]
    pub name: String,
    #[prost(int32, tag = "2")]
    #[bind(form = "count")]
    pub count: i32,
}

#[test]
fn absent_fields_keep_their_defaults() {
    let body = Greeting {
        name: String::new(),
        count: 3,
    }
    .encode_to_vec();

    let mut greeting = Greeting::default();
    Binder::new()
        .bind_body(&ProtoBufBinding, &body, &mut greeting)
        .unwrap();
    assert_eq!(greeting.name, "stranger");
    assert_eq!(greeting.count, 3);
}

#[test]
fn the_adapter_can_be_used_with_a_request() {
    let body = Greeting {
        name: "ada".into(),
        count: 1,
    }
    .encode_to_vec();

    let mut greeting = Greeting::default();
    Binder::new()
        .bind_with(
            &ProtoBufBinding,
            &post("/greet", "application/x-protobuf"),
            &body,
            &mut greeting,
        )
        .unwrap();
    assert_eq!(greeting.name, "ada");
}

#[test]
fn truncated_messages_are_decode_errors() {
    let mut greeting = Greeting::default();
    let err = Binder::new()
        .bind_body(&ProtoBufBinding, &[0x0a, 0x05, b'a'], &mut greeting)
        .unwrap_err();
    assert!(matches!(
        err,
        BindError::SourceDecode(SourceDecodeError::ProtoBuf(_))
    ));
}
