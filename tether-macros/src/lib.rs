//! Procedural macros for tether.
//!
//! | Macro | Generates |
//! |-------|-----------|
//! | [`Injectable`](derive@Injectable) | field table and lifecycle hooks |
//! | [`Zero`](derive@Zero) | "all fields are zero" check |
//! | [`ConfigSource`](derive@ConfigSource) | one named value per field |

#![forbid(unsafe_code)]

mod config_source;
mod injectable;
mod support;
mod zero;

use proc_macro::TokenStream;

/// Derive macro for the `Injectable` trait.
///
/// # Attributes
///
/// ## Container (`#[tether(...)]`)
/// - `startable`: the struct implements `Startable`
/// - `closeable`: the struct implements `Closeable`
/// - `provides(TraitA, TraitB)`: the struct can be injected as `Arc<dyn TraitA>`, ...
/// - `crate = "path"`: where tether lives (default `::tether`)
///
/// ## Field (`#[inject(...)]`)
/// - `#[inject]`: by type
/// - `#[inject("name")]`: by name
/// - `singleton`: fall back to the type, register auto-created objects by type too
/// - `nilable` (alias `cannil`): leave the field empty when nothing matches
///
/// Field categories follow the declared type: `Option<Arc<dyn Trait>>` is
/// an interface, `Option<Arc<T>>` a struct reference, anything else a value.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Injectable)]
/// #[tether(closeable, provides(Notifier))]
/// struct Mailer {
///     #[inject("smtp_host")]
///     host: String,
///     #[inject(singleton)]
///     pool: Option<Arc<Pool>>,
///     #[inject("audit", nilable)]
///     audit: Option<Arc<dyn AuditLog>>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(tether, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive(input)
}

/// Derive macro for the `Zero` trait: zero when every field is zero.
#[proc_macro_derive(Zero, attributes(tether))]
pub fn derive_zero(input: TokenStream) -> TokenStream {
    zero::derive(input)
}

/// Derive macro for the `ConfigSource` trait.
///
/// Every field becomes an entry named after the field in lowercase.
///
/// ## Field (`#[config(...)]`)
/// - `rename = "key"`: use another entry name
/// - `skip`: leave the field out
///
/// Field types must be `Clone + Send + Sync + 'static`.
#[proc_macro_derive(ConfigSource, attributes(tether, config))]
pub fn derive_config_source(input: TokenStream) -> TokenStream {
    config_source::derive(input)
}
