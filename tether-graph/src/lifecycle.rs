//! Lifecycle capabilities.
//!
//! A registered object may opt into either or both:
//! - [`Startable`]: called once, right after its dependencies are wired
//!   and before anyone else can see it
//! - [`Closeable`]: called once during [`Graph::close`](crate::Graph::close),
//!   in reverse registration order
//!
//! Objects are shared through `Arc`, so both callbacks take `&self`;
//! state that changes on start/close lives behind interior mutability.

use crate::error::BoxError;

/// Post-construction hook.
///
/// Returning an error aborts the registration: the object never enters
/// the registry.
pub trait Startable: Send + Sync {
    fn start(&self) -> Result<(), BoxError>;
}

/// Teardown hook.
///
/// A panic inside `close` is caught and logged; teardown goes on with
/// the objects registered earlier.
pub trait Closeable: Send + Sync {
    fn close(&self);
}
