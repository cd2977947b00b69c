//! Registering the fields of a configuration struct as named values.
//!
//! A [`ConfigSource`] lists its fields as `(lowercase name, value)`
//! entries; [`Graph::register_config`] registers each one, so other
//! objects can inject them by tag. `#[derive(ConfigSource)]` writes the
//! listing.

use std::any::Any;
use std::fmt;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::graph::Graph;
use crate::key::TypeRef;

/// A named value taken from a configuration struct.
pub struct ConfigEntry {
    key: String,
    type_ref: TypeRef,
    value: Box<dyn Any + Send + Sync>,
}

impl ConfigEntry {
    pub fn new<V: Send + Sync + 'static>(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            type_ref: TypeRef::of_value::<V>(),
            value: Box::new(value),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    /// Borrows the value as `V`.
    pub fn downcast_ref<V: 'static>(&self) -> Option<&V> {
        self.value.downcast_ref::<V>()
    }
}

impl fmt::Debug for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigEntry")
            .field("key", &self.key)
            .field("type", &self.type_ref)
            .finish()
    }
}

/// A struct whose fields become graph values.
pub trait ConfigSource {
    fn entries(&self) -> Vec<ConfigEntry>;
}

impl Graph {
    /// Registers every entry of `source` as a value; returns how many.
    ///
    /// Stops at the first failing entry. Entries registered before it stay.
    #[instrument(skip(self, source))]
    pub fn register_config(&self, source: &dyn ConfigSource) -> Result<usize> {
        let entries = source.entries();
        let count = entries.len();
        for entry in entries {
            self.register_entry(entry)?;
        }
        debug!(count, "Registered config entries");
        Ok(count)
    }

    fn register_entry(&self, entry: ConfigEntry) -> Result<()> {
        let ConfigEntry { key, type_ref, value } = entry;
        self.with_resolution(|cx| cx.register_value(&key, type_ref, value))
    }
}
