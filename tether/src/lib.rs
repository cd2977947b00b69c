//! # tether: runtime object graph for Rust
//!
//! Register named values and `#[derive(Injectable)]` structs; tagged
//! fields are wired by name or by type, missing struct dependencies are
//! created on demand, objects start as they are registered and close in
//! reverse order.
//!
//! ```
//! use std::sync::Arc;
//! use tether::{Graph, Injectable};
//!
//! #[derive(Default, Injectable)]
//! struct Pool {
//!     #[inject("pool_size")]
//!     size: usize,
//! }
//!
//! #[derive(Default, Injectable)]
//! struct Repo {
//!     #[inject(singleton)]
//!     pool: Option<Arc<Pool>>,
//! }
//!
//! let graph = Graph::new();
//! graph.register_value("pool_size", 8usize).unwrap();
//! let repo = graph.register::<Repo>("repo", None).unwrap();
//!
//! assert_eq!(repo.pool.as_ref().unwrap().size, 8);
//! graph.close();
//! ```
//!
//! [`global`] keeps one process-wide graph for programs that prefer free
//! functions.

pub use tether_derive::*;
pub use tether_graph::*;
pub use tether_support::*;

pub mod global;
