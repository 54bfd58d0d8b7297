use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod builder;
mod deref;
mod fields;

/// Generate accessors for struct fields.
///
/// `#[r]` creates a reader, `#[w]` creates `field_mut`, `#[w(set)]` creates
/// `set_field(value)` and `#[w(reducer)]` creates `set_field(|old| new)`.
/// Both accept `vis(..)`; `#[r(copy)]` returns by value and `skip` disables
/// the accessor. Attributes on the struct apply to every field.
#[proc_macro_derive(Fields, attributes(r, w))]
pub fn fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    fields::expand(input)
}

/// Generate `XBuilder` with chained setters, `Default` for both types and
/// `From<XBuilder> for X`. Field defaults come from `#[default = expr]`.
#[proc_macro_derive(Builder, attributes(default, builder))]
pub fn builder(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    builder::expand(input)
}

#[proc_macro_derive(Deref, attributes(deref))]
pub fn deref(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    deref::expand(input)
}
