//! Derive macros for tether, re-exported for use without the facade crate.

pub use tether_macros::{ConfigSource, Injectable, Zero};
