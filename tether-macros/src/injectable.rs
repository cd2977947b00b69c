//! `#[derive(Injectable)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Data, DeriveInput, Fields, LitStr, Meta, Token, parse_macro_input};
use tether_support::tag;

use crate::support::{Category, ContainerOpts, categorize};

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let opts = ContainerOpts::parse(&input.attrs).map_err(syn::Error::from)?;
    let krate = opts.crate_path();
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(ident.span(), "Injectable can only be derived for structs"));
    };
    let fields: Vec<&syn::Field> = match &data.fields {
        Fields::Named(named) => named.named.iter().collect(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new(
                ident.span(),
                "Injectable needs named fields or a unit struct",
            ));
        }
    };

    let mut descriptors = Vec::new();
    for field in fields {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("inject")) else {
            continue;
        };
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let spec = InjectSpec::from_attr(attr)?;
        let raw_tag = spec.raw_tag();
        let name = field_ident.unraw().to_string();

        let constructor = match categorize(&field.ty) {
            Category::Interface(inner) => quote!(interface::<#inner>),
            Category::Reference(inner) => quote!(reference::<#inner>),
            Category::Value => quote!(value),
        };
        descriptors.push(quote! {
            #krate::FieldDescriptor::#constructor(
                #name,
                #raw_tag,
                |s: &Self| &s.#field_ident,
                |s: &mut Self| &mut s.#field_ident,
            )
        });
    }

    let startable = opts.startable.then(|| {
        quote! {
            fn startable(
                this: &::std::sync::Arc<Self>,
            ) -> ::std::option::Option<::std::sync::Arc<dyn #krate::Startable>> {
                ::std::option::Option::Some(::std::sync::Arc::clone(this) as ::std::sync::Arc<dyn #krate::Startable>)
            }
        }
    });

    let closeable = opts.closeable.then(|| {
        quote! {
            fn closeable(
                this: &::std::sync::Arc<Self>,
            ) -> ::std::option::Option<::std::sync::Arc<dyn #krate::Closeable>> {
                ::std::option::Option::Some(::std::sync::Arc::clone(this) as ::std::sync::Arc<dyn #krate::Closeable>)
            }
        }
    });

    let provided: Vec<_> = opts.provides.iter().collect();
    let interfaces = (!provided.is_empty()).then(|| {
        quote! {
            fn views(this: &::std::sync::Arc<Self>) -> ::std::vec::Vec<#krate::View> {
                ::std::vec![
                    #(
                        #krate::View::of::<dyn #provided>(
                            ::std::sync::Arc::clone(this) as ::std::sync::Arc<dyn #provided>
                        )
                    ),*
                ]
            }

            fn provides(interface: ::std::any::TypeId) -> bool {
                false #(
                    || interface == ::std::any::TypeId::of::<::std::sync::Arc<dyn #provided>>()
                )*
            }
        }
    });

    Ok(quote! {
        impl #impl_generics #krate::Injectable for #ident #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<#krate::FieldDescriptor<Self>> {
                ::std::vec![#(#descriptors),*]
            }

            #startable
            #closeable
            #interfaces
        }
    })
}

/// Parsed `#[inject(...)]` attribute.
#[derive(Debug, Default, PartialEq, Eq)]
struct InjectSpec {
    key: String,
    singleton: bool,
    nilable: bool,
}

enum InjectArg {
    Key(LitStr),
    Flag(syn::Ident),
}

impl Parse for InjectArg {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        if input.peek(LitStr) {
            input.parse().map(InjectArg::Key)
        } else {
            input.parse().map(InjectArg::Flag)
        }
    }
}

impl InjectSpec {
    fn from_attr(attr: &syn::Attribute) -> syn::Result<Self> {
        let mut spec = Self::default();
        if let Meta::Path(_) = attr.meta {
            return Ok(spec);
        }

        let args = attr.parse_args_with(Punctuated::<InjectArg, Token![,]>::parse_terminated)?;
        for arg in args {
            match arg {
                InjectArg::Key(lit) => spec.key = lit.value(),
                InjectArg::Flag(flag) if flag == "singleton" => spec.singleton = true,
                InjectArg::Flag(flag) if flag == "nilable" || flag == "cannil" => spec.nilable = true,
                InjectArg::Flag(flag) => {
                    return Err(syn::Error::new(
                        flag.span(),
                        "expected a name string, `singleton`, `nilable` or `cannil`",
                    ));
                }
            }
        }
        Ok(spec)
    }

    /// Struct-tag text read back by the graph at registration.
    fn raw_tag(&self) -> String {
        let mut parts = vec![tag::pair("inject", &self.key)];
        if self.singleton {
            parts.push(tag::pair("singleton", "true"));
        }
        if self.nilable {
            parts.push(tag::pair("nilable", "true"));
        }
        parts.join(" ")
    }
}
