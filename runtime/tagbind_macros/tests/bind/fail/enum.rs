#![allow(dead_code)]
use tagbind::Bind;

#[derive(Bind)]
enum Shape {
    Circle { radius: f64 },
    Square { side: f64 },
}

fn main() {}
