use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Expr, Meta};

fn default_expr(attrs: &[Attribute]) -> syn::Result<Option<Expr>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("default")) else {
        return Ok(None);
    };

    match &attr.meta {
        Meta::NameValue(meta) => Ok(Some(meta.value.clone())),
        Meta::List(list) => list.parse_args().map(Some),
        Meta::Path(path) => Err(syn::Error::new_spanned(
            path,
            "expect #[default = expr] or #[default(expr)]",
        )),
    }
}

fn is_skip(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skip = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("builder")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expect #[builder(skip)]"))
            }
        })?;
    }
    Ok(skip)
}

pub(crate) fn expand(input: DeriveInput) -> TokenStream {
    let origin_ident = &input.ident;
    let vis = &input.vis;
    let builder_ident = format_ident!("{}Builder", origin_ident);

    let Data::Struct(data) = &input.data else {
        return syn::Error::new(origin_ident.span(), "Builder can only be derived for structs")
            .into_compile_error()
            .into();
    };

    let mut declarations = Vec::with_capacity(data.fields.len());
    let mut defaults = Vec::with_capacity(data.fields.len());
    let mut moves = Vec::with_capacity(data.fields.len());
    let mut setters = Vec::with_capacity(data.fields.len());

    for field in data.fields.iter() {
        let Some(field_ident) = &field.ident else {
            return syn::Error::new(origin_ident.span(), "Builder requires named fields")
                .into_compile_error()
                .into();
        };
        let ty = &field.ty;

        declarations.push(quote!(#field_ident: #ty,));

        match default_expr(&field.attrs) {
            Ok(Some(expr)) => defaults.push(quote!(#field_ident: #expr,)),
            Ok(None) => defaults.push(quote!(#field_ident: Default::default(),)),
            Err(err) => return err.into_compile_error().into(),
        }

        moves.push(quote!(#field_ident: value.#field_ident,));

        match is_skip(&field.attrs) {
            Ok(true) => {}
            Ok(false) => setters.push(quote!(
                pub fn #field_ident(mut self, value: #ty) -> Self {
                    self.#field_ident = value;
                    self
                }
            )),
            Err(err) => return err.into_compile_error().into(),
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let generics = &input.generics;

    quote!(
        #vis struct #builder_ident #generics #where_clause {
            #(#declarations)*
        }

        impl #impl_generics Default for #builder_ident #ty_generics #where_clause {
            fn default() -> Self {
                Self {
                    #(#defaults)*
                }
            }
        }

        impl #impl_generics Default for #origin_ident #ty_generics #where_clause {
            fn default() -> Self {
                #builder_ident::default().into()
            }
        }

        impl #impl_generics From<#builder_ident #ty_generics> for #origin_ident #ty_generics #where_clause {
            fn from(value: #builder_ident #ty_generics) -> Self {
                Self {
                    #(#moves)*
                }
            }
        }

        impl #impl_generics #builder_ident #ty_generics #where_clause {
            pub fn new() -> Self {
                Self::default()
            }

            #(#setters)*

            pub fn build(self) -> #origin_ident #ty_generics {
                self.into()
            }
        }
    )
    .into()
}
