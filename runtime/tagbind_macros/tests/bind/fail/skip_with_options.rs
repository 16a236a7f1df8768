#![allow(dead_code)]
use tagbind::Bind;

#[derive(Bind)]
struct Account {
    #[bind(form = "name")]
    name: String,
    #[bind(skip, default = "hunter2")]
    password: String,
}

fn main() {}
