//! `#[derive(Zero)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Index, parse_macro_input};

use crate::support::ContainerOpts;

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

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(ident.span(), "Zero can only be derived for structs"));
    };

    let checks: Vec<TokenStream2> = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.as_ref())
            .map(|f| quote!(#krate::Zero::is_zero(&self.#f)))
            .collect(),
        Fields::Unnamed(unnamed) => (0..unnamed.unnamed.len())
            .map(Index::from)
            .map(|i| quote!(#krate::Zero::is_zero(&self.#i)))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    Ok(quote! {
        impl #impl_generics #krate::Zero for #ident #ty_generics #where_clause {
            fn is_zero(&self) -> bool {
                true #(&& #checks)*
            }
        }
    })
}
