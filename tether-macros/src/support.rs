//! Shared attribute parsing and type inspection.

use darling::FromAttributes;
use darling::util::PathList;
use syn::{GenericArgument, PathArguments, Type};

/// Container options shared by every derive: `#[tether(...)]`.
#[derive(Debug, Default, FromAttributes)]
#[darling(attributes(tether))]
pub struct ContainerOpts {
    #[darling(default)]
    pub startable: bool,
    #[darling(default)]
    pub closeable: bool,
    #[darling(default)]
    pub provides: PathList,
    #[darling(rename = "crate")]
    pub krate: Option<syn::Path>,
}

impl ContainerOpts {
    pub fn parse(attrs: &[syn::Attribute]) -> darling::Result<Self> {
        Self::from_attributes(attrs)
    }

    /// Path of the facade crate in generated code.
    pub fn crate_path(&self) -> syn::Path {
        self.krate.clone().unwrap_or_else(|| syn::parse_quote!(::tether))
    }
}

/// How a field takes part in injection, read off its declared type.
pub enum Category<'a> {
    /// `Option<Arc<dyn Trait>>`: carries the `dyn Trait` type
    Interface(&'a Type),
    /// `Option<Arc<T>>`: carries `T`
    Reference(&'a Type),
    Value,
}

pub fn categorize(ty: &Type) -> Category<'_> {
    let Some(inner) = single_arg(ty, "Option").and_then(|arc| single_arg(arc, "Arc")) else {
        return Category::Value;
    };
    match inner {
        Type::TraitObject(_) => Category::Interface(inner),
        _ => Category::Reference(inner),
    }
}

/// `Wrapper<T>` → `T` when the last path segment is `wrapper`.
fn single_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}
