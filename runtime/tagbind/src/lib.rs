//! Bind loosely-typed request data onto strongly-typed structs.
//!
//! `tagbind` converts url-encoded forms, query strings, path parameters,
//! dynamic key/value maps and self-describing bodies (JSON, XML, YAML,
//! MessagePack, Protobuf) into your own types. Which input key feeds which
//! field, and what happens when the key is missing, is declared on the
//! fields themselves:
//!
//! ```rust
//! use tagbind::{Bind, Binder, FormValues, binding::FormPostBinding};
//!
//! #[derive(Bind, Default, Debug)]
//! pub struct Signup {
//!     #[bind(form = "email")]
//!     email: String,
//!     #[bind(form = "age,default=18")]
//!     age: u8,
//!     #[bind(form = "tags")]
//!     tags: Vec<String>,
//! }
//!
//! # fn main() -> Result<(), tagbind::errors::BindError> {
//! let binder = Binder::new();
//! let mut signup = Signup::default();
//! binder.bind_body(&FormPostBinding, b"email=ada%40example.com&tags=a&tags=b", &mut signup)?;
//!
//! assert_eq!(signup.email, "ada@example.com");
//! assert_eq!(signup.age, 18);
//! assert_eq!(signup.tags, vec!["a", "b"]);
//! # Ok(())
//! # }
//! ```
//!
//! The main entry points are:
//!
//! - [`Binder`], which negotiates the right [binding strategy](binding::Strategy)
//!   for a request and enforces the configured body size limit;
//! - the [`binding`] module, one adapter per wire format;
//! - the [`nullable`] module, value-plus-validity scalars that round-trip through
//!   database drivers, JSON and forms;
//! - the [`Registry`], where types with their own form conversion rules are plugged in;
//! - [`record::db_values`], which turns a bound struct back into a column map.
extern crate self as tagbind;

pub use binder::{BindContext, Binder};
pub use field::Bind;
pub use form_values::FormValues;
pub use registry::Registry;
pub use tagbind_macros::Bind;
pub use value::Value;

mod binder;
pub mod binding;
pub mod config;
pub mod defaults;
pub mod errors;
pub mod field;
mod form_values;
pub mod mime_types;
pub mod nullable;
pub mod record;
mod registry;
pub mod request;
pub mod upload;
pub mod validation;
mod value;
pub mod walker;
