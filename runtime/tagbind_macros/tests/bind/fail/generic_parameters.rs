#![allow(dead_code)]
use tagbind::Bind;

#[derive(Bind)]
struct Wrapper<T> {
    #[bind(form = "value")]
    value: T,
}

fn main() {}
