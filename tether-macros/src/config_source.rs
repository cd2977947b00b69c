//! `#[derive(ConfigSource)]`.

use darling::FromAttributes;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

use crate::support::ContainerOpts;

/// Field options: `#[config(rename = "...", skip)]`.
#[derive(Debug, Default, FromAttributes)]
#[darling(attributes(config))]
struct FieldOpts {
    rename: Option<String>,
    #[darling(default)]
    skip: bool,
}

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let krate = ContainerOpts::parse(&input.attrs)
        .map_err(syn::Error::from)?
        .crate_path();
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new(
                    ident.span(),
                    "ConfigSource needs a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                ident.span(),
                "ConfigSource can only be derived for structs",
            ));
        }
    };

    let mut entries = Vec::new();
    for field in fields {
        let opts = FieldOpts::from_attributes(&field.attrs).map_err(syn::Error::from)?;
        let Some(field_ident) = &field.ident else {
            continue;
        };
        if opts.skip {
            continue;
        }
        let key = opts
            .rename
            .unwrap_or_else(|| field_ident.unraw().to_string().to_lowercase());
        entries.push(quote! {
            #krate::ConfigEntry::new(#key, ::std::clone::Clone::clone(&self.#field_ident))
        });
    }

    Ok(quote! {
        impl #impl_generics #krate::ConfigSource for #ident #ty_generics #where_clause {
            fn entries(&self) -> ::std::vec::Vec<#krate::ConfigEntry> {
                ::std::vec![#(#entries),*]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_lowercase_field_names() {
        let input: DeriveInput = syn::parse_quote! {
            struct Config4T {
                Abc: i32,
                #[config(rename = "definition")]
                Def: String,
                #[config(skip)]
                secret: String,
            }
        };
        let out = expand(&input).unwrap().to_string();
        assert!(out.contains("\"abc\""));
        assert!(out.contains("\"definition\""));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn unknown_field_option_is_an_error() {
        let input: DeriveInput = syn::parse_quote! {
            struct Config {
                #[config(flatten)]
                inner: Inner,
            }
        };
        assert!(expand(&input).is_err());
    }
}
