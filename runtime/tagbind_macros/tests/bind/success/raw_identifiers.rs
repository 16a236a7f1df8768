#[derive(tagbind::Bind, Default)]
struct Item {
    #[bind(form = "type")]
    r#type: String,
    #[bind(form = "tags")]
    tags: Vec<i64>,
    #[bind(form = "nickname")]
    nickname: tagbind::nullable::NullString,
}

fn main() {
    let mut item = Item::default();
    let _ = tagbind::walker::map_form(
        &mut item,
        &tagbind::FormValues::parse(b"type=book&tags=1&tags=2"),
        "form",
        &tagbind::Registry::with_builtins(),
        &jiff::tz::TimeZone::UTC,
    );
    assert_eq!(item.r#type, "book");
    assert_eq!(item.tags, vec![1, 2]);
}
