//! The parts of an incoming HTTP request that drive binding.
pub use request_head::RequestHead;

mod request_head;
