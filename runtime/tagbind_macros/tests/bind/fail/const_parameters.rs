#![allow(dead_code)]
use tagbind::Bind;

#[derive(Bind)]
struct Buffer<const N: usize> {
    #[bind(form = "bytes")]
    bytes: [u8; N],
}

fn main() {}
