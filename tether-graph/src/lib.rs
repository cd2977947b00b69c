//! Core object-graph engine for tether.
//!
//! Registers named values and injectable structs, wires tagged fields by
//! name or by type, auto-creates missing struct dependencies, starts
//! objects as they are registered and closes them in reverse order.

mod assign;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod implementation;
pub mod introspect;
pub mod key;
pub mod lifecycle;
pub mod object;
mod registry;
mod resolve;
pub mod zero;

pub use config::{ConfigEntry, ConfigSource};
pub use descriptor::{DependencyTag, FieldDependency, FieldDescriptor, Injectable};
pub use error::{BoxError, GraphError, Result};
pub use graph::{Graph, GraphBuilder};
pub use implementation::{Implementation, ImplementationRegistry};
pub use introspect::{Entry, ObjectSummary};
pub use key::{Shape, TypeRef};
pub use lifecycle::{Closeable, Startable};
pub use object::{Object, View};
pub use zero::Zero;

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
