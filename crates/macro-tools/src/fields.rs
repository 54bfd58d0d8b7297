use proc_macro::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::{parenthesized, Attribute, Data, DeriveInput, Meta, Type, Visibility};

// readers of these types return a copy instead of a reference
const COPY_TYPES: &[&str] = &[
    "bool",
    "u8",
    "u16",
    "u32",
    "u64",
    "u128",
    "usize",
    "i8",
    "i16",
    "i32",
    "i64",
    "i128",
    "isize",
    "f32",
    "f64",
    "FloatNum",
    "Mass",
    "ID",
    "ObjectId",
    "ConstraintId",
];

#[derive(Clone)]
struct ReadOption {
    vis: Visibility,
    copy: bool,
    skip: bool,
}

#[derive(Clone, Copy, PartialEq)]
enum WriteStyle {
    Mut,
    Set,
    Reducer,
}

#[derive(Clone)]
struct WriteOption {
    vis: Visibility,
    style: WriteStyle,
    skip: bool,
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}

fn parse_read(attr: &Attribute, vis: &Visibility) -> syn::Result<ReadOption> {
    let mut option = ReadOption {
        vis: vis.clone(),
        copy: false,
        skip: false,
    };

    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(option);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("vis") {
            let content;
            parenthesized!(content in meta.input);
            option.vis = content.parse()?;
        } else if meta.path.is_ident("copy") {
            option.copy = true;
        } else if meta.path.is_ident("skip") {
            option.skip = true;
        } else {
            return Err(meta.error("expect one of vis(..), copy, skip"));
        }
        Ok(())
    })?;

    Ok(option)
}

fn parse_write(attr: &Attribute, vis: &Visibility) -> syn::Result<WriteOption> {
    let mut option = WriteOption {
        vis: vis.clone(),
        style: WriteStyle::Mut,
        skip: false,
    };

    if matches!(attr.meta, Meta::Path(_)) {
        return Ok(option);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("vis") {
            let content;
            parenthesized!(content in meta.input);
            option.vis = content.parse()?;
        } else if meta.path.is_ident("set") {
            option.style = WriteStyle::Set;
        } else if meta.path.is_ident("reducer") {
            option.style = WriteStyle::Reducer;
        } else if meta.path.is_ident("skip") {
            option.skip = true;
        } else {
            return Err(meta.error("expect one of vis(..), set, reducer, skip"));
        }
        Ok(())
    })?;

    Ok(option)
}

fn is_copy_type(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => {
            let name = path.to_token_stream().to_string();
            COPY_TYPES.contains(&name.as_str())
        }
        _ => false,
    }
}

pub(crate) fn expand(input: DeriveInput) -> TokenStream {
    let ident = &input.ident;
    let vis = &input.vis;

    let Data::Struct(data) = &input.data else {
        return syn::Error::new(ident.span(), "Fields can only be derived for structs")
            .into_compile_error()
            .into();
    };

    let global_read = match find_attr(&input.attrs, "r").map(|attr| parse_read(attr, vis)) {
        Some(Err(err)) => return err.into_compile_error().into(),
        Some(Ok(option)) => Some(option),
        None => None,
    };

    let global_write = match find_attr(&input.attrs, "w").map(|attr| parse_write(attr, vis)) {
        Some(Err(err)) => return err.into_compile_error().into(),
        Some(Ok(option)) => Some(option),
        None => None,
    };

    let mut methods = Vec::with_capacity(data.fields.len());

    for field in data.fields.iter() {
        let Some(field_ident) = &field.ident else {
            return syn::Error::new(ident.span(), "Fields requires named fields")
                .into_compile_error()
                .into();
        };
        let ty = &field.ty;

        let read = match find_attr(&field.attrs, "r").map(|attr| parse_read(attr, vis)) {
            Some(Err(err)) => return err.into_compile_error().into(),
            Some(Ok(option)) => Some(option),
            None => global_read.clone(),
        };

        let write = match find_attr(&field.attrs, "w").map(|attr| parse_write(attr, vis)) {
            Some(Err(err)) => return err.into_compile_error().into(),
            Some(Ok(option)) => Some(option),
            None => global_write.clone(),
        };

        if let Some(ReadOption { vis, copy, skip }) = read {
            if !skip {
                if copy || is_copy_type(ty) {
                    methods.push(quote!(
                        #[inline]
                        #vis fn #field_ident(&self) -> #ty {
                            self.#field_ident
                        }
                    ));
                } else {
                    methods.push(quote!(
                        #[inline]
                        #vis fn #field_ident(&self) -> &#ty {
                            &self.#field_ident
                        }
                    ));
                }
            }
        }

        if let Some(WriteOption { vis, style, skip }) = write {
            if skip {
                continue;
            }
            match style {
                WriteStyle::Mut => {
                    let method = format_ident!("{}_mut", field_ident);
                    methods.push(quote!(
                        #[inline]
                        #vis fn #method(&mut self) -> &mut #ty {
                            &mut self.#field_ident
                        }
                    ));
                }
                WriteStyle::Set => {
                    let method = format_ident!("set_{}", field_ident);
                    methods.push(quote!(
                        #[inline]
                        #vis fn #method(&mut self, value: #ty) -> &mut Self {
                            self.#field_ident = value;
                            self
                        }
                    ));
                }
                WriteStyle::Reducer => {
                    let method = format_ident!("set_{}", field_ident);
                    methods.push(quote!(
                        #[inline]
                        #vis fn #method(&mut self, reducer: impl FnOnce(#ty) -> #ty) -> &mut Self {
                            self.#field_ident = reducer(core::mem::take(&mut self.#field_ident));
                            self
                        }
                    ));
                }
            }
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote!(
        impl #impl_generics #ident #ty_generics #where_clause {
            #(#methods)*
        }
    )
    .into()
}
