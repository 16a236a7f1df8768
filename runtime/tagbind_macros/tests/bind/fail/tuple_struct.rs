#![allow(dead_code)]
use tagbind::Bind;

#[derive(Bind)]
struct Pair(String, u32);

fn main() {}
