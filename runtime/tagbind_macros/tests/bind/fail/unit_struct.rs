#![allow(dead_code)]
use tagbind::Bind;

#[derive(Bind)]
struct Marker;

fn main() {}
