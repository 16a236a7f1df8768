use darling::{
    FromDeriveInput, FromField,
    util::{Flag, Ignored},
};
use proc_macro::TokenStream;
use quote::{quote, quote_spanned};
use syn::{DeriveInput, ext::IdentExt, parse_macro_input, spanned::Spanned};

#[derive(FromDeriveInput)]
#[darling(supports(struct_named))]
struct BindInput {
    data: darling::ast::Data<Ignored, ParsedField>,
    generics: syn::Generics,
    ident: syn::Ident,
}

// The options accepted by `#[bind(..)]` on each field.
#[derive(Debug, FromField)]
#[darling(attributes(bind))]
struct ParsedField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    form: Option<String>,
    uri: Option<String>,
    array: Option<String>,
    db: Option<String>,
    default: Option<String>,
    time_format: Option<String>,
    time_location: Option<String>,
    time_utc: Flag,
    skip: Flag,
}

impl ParsedField {
    /// The tag table for this field, as `(key, value)` pairs.
    ///
    /// Flags are encoded as `"true"`.
    fn tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = Vec::new();
        let keyed = [
            ("form", &self.form),
            ("uri", &self.uri),
            ("array", &self.array),
            ("db", &self.db),
            ("default", &self.default),
            ("time_format", &self.time_format),
            ("time_location", &self.time_location),
        ];
        for (key, value) in keyed {
            if let Some(value) = value {
                tags.push((key, value.clone()));
            }
        }
        if self.time_utc.is_present() {
            tags.push(("time_utc", "true".to_string()));
        }
        tags
    }
}

pub(super) fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match _derive_bind(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn _derive_bind(input: DeriveInput) -> Result<proc_macro2::TokenStream, darling::Error> {
    reject_unsupported_shapes(&input)?;
    let input = BindInput::from_derive_input(&input)?;
    reject_invalid_inputs(&input)?;

    let struct_ident = &input.ident;
    let fields = input
        .data
        .take_struct()
        // Unsupported shapes are rejected before we get here.
        .expect("`Bind` only supports structs with named fields.");

    let mut errors = darling::Error::accumulator();
    let mut visits = Vec::with_capacity(fields.len());
    for field in fields.iter() {
        if field.skip.is_present() {
            if field.tags().is_empty() {
                continue;
            }
            let ident = field.ident.as_ref().expect("Named fields always have an identifier");
            errors.push(
                darling::Error::custom(format!(
                    "`{ident}` is marked as `skip`, it can't have other binding options."
                ))
                .with_span(ident),
            );
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let name = ident.unraw().to_string();
        let (keys, values): (Vec<_>, Vec<_>) = field.tags().into_iter().unzip();
        let ty_span = field.ty.span();
        visits.push(quote_spanned! { ty_span =>
            __visitor.visit(
                &::tagbind::field::FieldDescriptor::new(#name, &[#((#keys, #values)),*]),
                ::tagbind::field::BindField::slot(&mut self.#ident),
            )?;
        });
    }
    errors.finish()?;

    let tokens = quote! {
        #[automatically_derived]
        impl ::tagbind::Bind for #struct_ident {
            fn visit_fields(
                &mut self,
                __visitor: &mut dyn ::tagbind::field::FieldVisitor,
            ) -> ::core::result::Result<(), ::tagbind::errors::BindError> {
                #(#visits)*
                ::core::result::Result::Ok(())
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        #[automatically_derived]
        impl ::tagbind::field::BindField for #struct_ident {
            fn slot(&mut self) -> ::tagbind::field::Slot<'_> {
                ::tagbind::field::Slot::Nested(self)
            }
        }
    };
    Ok(tokens)
}

fn reject_unsupported_shapes(input: &DeriveInput) -> Result<(), darling::Error> {
    match &input.data {
        syn::Data::Struct(data) if matches!(data.fields, syn::Fields::Named(_)) => Ok(()),
        _ => Err(darling::Error::custom(format!(
            "`#[derive(Bind)]` can only be applied to structs with named fields, `{}` isn't one.",
            input.ident
        ))
        .with_span(&input.ident)),
    }
}

fn reject_invalid_inputs(input: &BindInput) -> Result<(), darling::Error> {
    let struct_ident = &input.ident;
    if let Some(generic) = input.generics.type_params().next() {
        return Err(darling::Error::custom(format!(
            "`#[derive(Bind)]` can't be applied to structs with generic type parameters, such as `{struct_ident}`. Consider using concrete types instead.",
        ))
        .with_span(&generic.ident));
    }
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(darling::Error::custom(format!(
            "`#[derive(Bind)]` can't be applied to structs with generic lifetimes, such as `{struct_ident}`. Binding targets must own their data.",
        ))
        .with_span(&lifetime.lifetime.ident));
    }
    if let Some(param) = input.generics.const_params().next() {
        return Err(darling::Error::custom(format!(
            "`#[derive(Bind)]` can't be applied to structs with const generic parameters, such as `{struct_ident}`.",
        ))
        .with_span(&param.ident));
    }
    Ok(())
}
