use jiff::civil::date;
use jiff::{Timestamp, Zoned};
use tagbind::binding::{FormBinding, FormPostBinding, QueryBinding, UriBinding};
use tagbind::nullable::NullInt32;
use tagbind::{Bind, Binder, FormValues};

use crate::fixtures::{get, post};

#[derive(Bind, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Search {
    #[bind(form = "q")]
    pub q: String,
    #[bind(form = "page,default=1")]
    pub page: u32,
    #[bind(form = "per_page,default=20")]
    pub per_page: u32,
    #[bind(form = "tag")]
    pub tags: Vec<String>,
}

#[test]
fn get_requests_bind_the_query_string() {
    let mut search = Search::default();
    Binder::new()
        .bind(&get("/search?q=rust&page=2&tag=a&tag=b"), b"", &mut search)
        .unwrap();

    assert_eq!(
        search,
        Search {
            q: "rust".into(),
            page: 2,
            per_page: 20,
            tags: vec!["a".into(), "b".into()],
        }
    );
}

#[test]
fn body_values_come_before_query_values() {
    let head = post("/search?q=query&tag=c", "application/x-www-form-urlencoded");
    let mut search = Search::default();
    Binder::new()
        .bind_with(&FormBinding, &head, b"q=body&tag=a", &mut search)
        .unwrap();

    assert_eq!(search.q, "body");
    assert_eq!(search.tags, vec!["a", "c"]);
}

#[test]
fn query_binding_ignores_the_body() {
    let head = post("/search?q=query", "application/x-www-form-urlencoded");
    let mut search = Search::default();
    Binder::new()
        .bind_with(&QueryBinding, &head, b"q=body", &mut search)
        .unwrap();

    assert_eq!(search.q, "query");
}

#[test]
fn empty_values_never_overwrite() {
    let mut search = Search {
        q: "keep".into(),
        ..Search::default()
    };
    Binder::new()
        .bind_body(&FormPostBinding, b"q=&page=", &mut search)
        .unwrap();

    assert_eq!(search.q, "keep");
    // The default was injected before the walk, and the empty input didn't replace it.
    assert_eq!(search.page, 1);
}

#[derive(Bind, Debug, Default, Clone, PartialEq)]
struct Preferences {
    #[bind(form = "active")]
    active: bool,
    #[bind(form = "ratio")]
    ratio: f64,
    #[bind(form = "offset")]
    offset: i64,
    #[bind(form = "ids")]
    ids: Vec<u32>,
    #[bind(form = "since")]
    since: Zoned,
    #[bind(form = "score")]
    score: NullInt32,
    #[bind(form = "nickname")]
    nickname: Option<String>,
}

#[test]
fn empty_values_never_overwrite_any_kind_of_field() {
    let before = Preferences {
        active: true,
        ratio: 0.25,
        offset: -7,
        ids: vec![3, 4],
        since: date(2024, 3, 1).at(9, 30, 0, 0).in_tz("Europe/Rome").unwrap(),
        score: NullInt32::new(11),
        nickname: None,
    };
    let mut preferences = before.clone();
    Binder::new()
        .bind_body(
            &FormPostBinding,
            b"active=&ratio=&offset=&ids=&since=&score=&nickname=",
            &mut preferences,
        )
        .unwrap();

    assert_eq!(preferences, before);
}

#[test]
fn the_first_conversion_failure_aborts_the_bind() {
    let mut search = Search::default();
    let err = Binder::new()
        .bind_body(&FormPostBinding, b"q=ok&page=many&per_page=5", &mut search)
        .unwrap_err();

    insta::assert_snapshot!(err, @r"
    Failed to convert `many` into `u32` for the `page` field.
    invalid digit found in string
    ");
    // Fields bound before the failure are not rolled back.
    assert_eq!(search.q, "ok");
    assert_eq!(search.per_page, 20);
}

#[derive(Bind, Debug, Default)]
struct Filters {
    #[bind(form = "min")]
    min: NullInt32,
    #[bind(form = "max")]
    max: NullInt32,
}

#[test]
fn nullable_fields_are_only_valid_when_submitted() {
    let mut filters = Filters::default();
    Binder::new()
        .bind_body(&FormPostBinding, b"min=3", &mut filters)
        .unwrap();

    assert_eq!(filters.min, NullInt32::new(3));
    assert_eq!(filters.max, NullInt32::null());
}

#[derive(Bind, Debug, Default)]
struct Booking {
    #[bind(form = "at")]
    at: Zoned,
    #[bind(form = "day", time_format = "%Y-%m-%d", time_location = "Europe/Rome")]
    day: Zoned,
}

#[test]
fn time_fields_follow_their_format_and_location() {
    let mut booking = Booking::default();
    Binder::new()
        .bind_body(
            &FormPostBinding,
            b"at=2024-05-01T10%3A00%3A00Z&day=2024-05-01",
            &mut booking,
        )
        .unwrap();

    let expected: Timestamp = "2024-05-01T10:00:00Z".parse().unwrap();
    assert_eq!(booking.at.timestamp(), expected);
    assert_eq!(booking.day.datetime(), date(2024, 5, 1).at(0, 0, 0, 0));
    assert_eq!(booking.day.time_zone().iana_name(), Some("Europe/Rome"));
}

#[derive(Bind, Debug, Default)]
struct Article {
    #[bind(uri = "id")]
    id: u64,
    #[bind(uri = "slug")]
    slug: String,
    #[bind(form = "title")]
    title: String,
}

#[test]
fn path_parameters_use_the_uri_tags() {
    let mut params = FormValues::new();
    params.append("id", "42");
    params.append("slug", "hello-world");
    params.append("title", "ignored");

    let mut article = Article::default();
    Binder::new()
        .bind_uri(&UriBinding, &params, &mut article)
        .unwrap();

    assert_eq!(article.id, 42);
    assert_eq!(article.slug, "hello-world");
    assert_eq!(article.title, "");
}

#[derive(Bind, Debug, Default)]
struct Meeting {
    #[bind(form = "start")]
    start: Zoned,
}

#[test]
fn rfc3339_is_the_default_time_format() {
    let mut meeting = Meeting::default();
    Binder::new()
        .bind_body(&FormPostBinding, b"start=2022-01-02T03%3A04%3A05Z", &mut meeting)
        .unwrap();

    let expected: Timestamp = "2022-01-02T03:04:05Z".parse().unwrap();
    assert_eq!(meeting.start.timestamp(), expected);
}

#[test]
fn empty_time_input_leaves_the_zero_instant() {
    let mut meeting = Meeting::default();
    Binder::new()
        .bind_body(&FormPostBinding, b"start=", &mut meeting)
        .unwrap();

    assert_eq!(meeting.start.timestamp(), tagbind::field::zero_time().timestamp());
}

#[test]
fn defaults_make_no_difference_when_every_field_is_submitted() {
    let input = FormValues::parse(b"q=rust&page=4&per_page=5&tag=x");
    let registry = tagbind::Registry::with_builtins();
    let tz = jiff::tz::TimeZone::UTC;

    let mut plain = Search::default();
    tagbind::walker::map_form(&mut plain, &input, "form", &registry, &tz).unwrap();

    let mut injected = Search::default();
    tagbind::defaults::inject_defaults(&mut injected, "form", &registry, &tz).unwrap();
    tagbind::walker::map_form(&mut injected, &input, "form", &registry, &tz).unwrap();

    assert_eq!(plain, injected);
}
