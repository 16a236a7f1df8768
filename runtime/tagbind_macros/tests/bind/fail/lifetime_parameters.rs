#![allow(dead_code)]
use tagbind::Bind;

#[derive(Bind)]
struct Borrowed<'a> {
    #[bind(form = "name")]
    name: &'a str,
}

fn main() {}
