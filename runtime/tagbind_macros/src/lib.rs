use proc_macro::TokenStream;

mod bind;

/// Derive an implementation of `tagbind::Bind` (and `tagbind::field::BindField`)
/// for a struct with named fields.
///
/// Field behaviour is driven by the `#[bind(..)]` attribute:
///
/// ```rust,ignore
/// #[derive(tagbind::Bind)]
/// pub struct Signup {
///     #[bind(form = "email")]
///     email: String,
///     #[bind(form = "age,default=18")]
///     age: u8,
///     #[bind(form = "starts_at", time_format = "%Y-%m-%d %H:%M", time_location = "Europe/Rome")]
///     starts_at: jiff::Zoned,
///     #[bind(skip)]
///     internal: Vec<Box<dyn std::any::Any>>,
/// }
/// ```
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    bind::derive_bind(input)
}
