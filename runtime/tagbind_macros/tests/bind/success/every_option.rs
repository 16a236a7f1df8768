use tagbind::Bind;

#[derive(Bind, Default)]
pub struct Address {
    #[bind(form = "city")]
    pub city: String,
}

#[derive(Bind, Default)]
pub struct Signup {
    #[bind(form = "email", uri = "email", array = "email", db = "email")]
    pub email: String,
    #[bind(form = "age,default=18")]
    pub age: Option<u8>,
    #[bind(default = "en")]
    pub locale: String,
    #[bind(
        form = "born_on",
        time_format = "%Y-%m-%d",
        time_location = "Europe/Rome"
    )]
    pub born_on: jiff::Zoned,
    #[bind(form = "seen_at", time_utc)]
    pub seen_at: Option<jiff::Timestamp>,
    pub address: Address,
    #[bind(skip)]
    pub cache: std::collections::HashMap<String, String>,
}

fn main() {
    let mut signup = Signup::default();
    let _ = tagbind::defaults::inject_defaults(
        &mut signup,
        "form",
        &tagbind::Registry::with_builtins(),
        &jiff::tz::TimeZone::UTC,
    );
}
