//! # The Graph
//!
//! Owns the registry, resolves dependencies on registration and tears
//! everything down in reverse order.
//!
//! # Architecture
//! ```text
//! GraphBuilder ──build()──> Graph
//!                             │
//!              register*() ───┤──> Resolution (write lock held)
//!              find*/get*() ──┤──> Registry    (read lock)
//!                   close() ──┘──> reverse walk, Closeable::close
//! ```
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use tether_graph::{FieldDescriptor, Graph, Injectable};
//!
//! #[derive(Default)]
//! struct Database {
//!     url: String,
//! }
//!
//! impl Injectable for Database {
//!     fn fields() -> Vec<FieldDescriptor<Self>> {
//!         vec![FieldDescriptor::value(
//!             "url",
//!             r#"inject:"db_url""#,
//!             |d: &Database| &d.url,
//!             |d: &mut Database| &mut d.url,
//!         )]
//!     }
//! }
//!
//! let graph = Graph::new();
//! graph.register_value("db_url", String::from("postgres://localhost")).unwrap();
//! let db: Arc<Database> = graph.register_single("db", None).unwrap();
//!
//! assert_eq!(db.url, "postgres://localhost");
//! assert!(Arc::ptr_eq(&db, &graph.get_by_type::<Database>().unwrap()));
//! graph.close();
//! assert!(graph.is_empty());
//! ```

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{Level, debug, error, info, instrument};

use crate::descriptor::Injectable;
use crate::error::{GraphError, Result};
use crate::implementation::{Implementation, ImplementationRegistry};
use crate::introspect::{self, Entry};
use crate::key::TypeRef;
use crate::object::Object;
use crate::registry::Registry;
use crate::resolve::Resolution;

/// Start callbacks slower than this are logged.
pub const DEFAULT_SLOW_START_THRESHOLD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub slow_start_threshold: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            slow_start_threshold: DEFAULT_SLOW_START_THRESHOLD,
        }
    }
}

// ============================================================
// GraphBuilder
// ============================================================

/// Configures a [`Graph`].
///
/// # Examples
/// ```ignore
/// let graph = Graph::builder()
///     .slow_start_threshold(Duration::from_secs(1))
///     .implementation::<SmtpSender>("mailer")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    settings: Settings,
    implementations: ImplementationRegistry,
}

impl GraphBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Warn when a start callback takes longer than this.
    pub fn slow_start_threshold(mut self, threshold: Duration) -> Self {
        self.settings.slow_start_threshold = threshold;
        self
    }

    /// List `T` as a candidate for interface fields tagged with `key`.
    ///
    /// Consulted before any `implementation!` submission.
    pub fn implementation<T: Injectable>(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.implementations.add(Implementation::named::<T>(key));
        self
    }

    /// Whether link-time `implementation!` submissions are consulted (default: yes).
    pub fn use_inventory(mut self, enabled: bool) -> Self {
        self.implementations.set_use_inventory(enabled);
        self
    }

    pub fn build(self) -> Graph {
        debug!(
            slow_start_threshold = ?self.settings.slow_start_threshold,
            "Building graph"
        );
        Graph {
            state: RwLock::new(Registry::new()),
            settings: self.settings,
            implementations: self.implementations,
        }
    }
}

// ═══════════════════════════════════════════
// Graph
// ═══════════════════════════════════════════

/// Thread-safe object graph.
///
/// Registration holds the write lock for the whole recursive resolution;
/// lookups share the read lock. Start and close callbacks run under the
/// lock and must not call back into the same graph.
pub struct Graph {
    state: RwLock<Registry>,
    settings: Settings,
    implementations: ImplementationRegistry,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Graph with default settings.
    pub fn new() -> Self {
        GraphBuilder::new().build()
    }

    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    pub(crate) fn with_resolution<R>(&self, f: impl FnOnce(&mut Resolution<'_>) -> Result<R>) -> Result<R> {
        let mut registry = self.state.write();
        let mut cx = Resolution::new(&mut registry, &self.settings, &self.implementations);
        f(&mut cx)
    }

    // ── Registration ──

    /// Registers a struct reference, injecting its tagged zero fields.
    ///
    /// `None` allocates `T::default()`. An empty name defaults to the
    /// canonical type name.
    #[instrument(skip(self, value), fields(type_name = type_name::<T>()))]
    pub fn register<T: Injectable>(&self, name: &str, value: Option<T>) -> Result<Arc<T>> {
        self.with_resolution(|cx| cx.register_struct(name, value, false, false))
    }

    /// Like [`register`](Self::register), also reachable by type.
    #[instrument(skip(self, value), fields(type_name = type_name::<T>()))]
    pub fn register_single<T: Injectable>(&self, name: &str, value: Option<T>) -> Result<Arc<T>> {
        self.with_resolution(|cx| cx.register_struct(name, value, true, false))
    }

    /// Registers a struct reference; a provided instance is taken as already filled.
    #[instrument(skip(self, value), fields(type_name = type_name::<T>()))]
    pub fn register_no_fill<T: Injectable>(&self, name: &str, value: Option<T>) -> Result<Arc<T>> {
        self.with_resolution(|cx| cx.register_struct(name, value, false, true))
    }

    #[instrument(skip(self, value), fields(type_name = type_name::<T>()))]
    pub fn register_single_no_fill<T: Injectable>(
        &self,
        name: &str,
        value: Option<T>,
    ) -> Result<Arc<T>> {
        self.with_resolution(|cx| cx.register_struct(name, value, true, true))
    }

    /// Stores a plain value under `name`. No injection happens.
    #[instrument(skip(self, value), fields(type_name = type_name::<V>()))]
    pub fn register_value<V: Send + Sync + 'static>(&self, name: &str, value: V) -> Result<()> {
        self.with_resolution(|cx| cx.register_value(name, TypeRef::of_value::<V>(), Box::new(value)))
    }

    /// Stores an interface handle, injectable into `Option<Arc<I>>` fields.
    #[instrument(skip(self, value), fields(type_name = type_name::<I>()))]
    pub fn register_interface<I: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
        value: Arc<I>,
    ) -> Result<()> {
        self.with_resolution(|cx| cx.register_value(name, TypeRef::of_interface::<I>(), Box::new(value)))
    }

    /// Stores `Some(value)`; `None` is [`GraphError::NilRegistration`].
    #[instrument(skip(self, value), fields(type_name = type_name::<V>()))]
    pub fn register_optional<V: Send + Sync + 'static>(
        &self,
        name: &str,
        value: Option<V>,
    ) -> Result<()> {
        match value {
            Some(value) => self.register_value(name, value),
            None => Err(GraphError::NilRegistration {
                name: name.to_string(),
                type_name: type_name::<V>(),
            }),
        }
    }

    // ── Register or fail ──

    /// [`register`](Self::register), logging and panicking on error.
    pub fn register_or_fail<T: Injectable>(&self, name: &str, value: Option<T>) -> Arc<T> {
        or_fail(name, self.register(name, value))
    }

    pub fn register_single_or_fail<T: Injectable>(&self, name: &str, value: Option<T>) -> Arc<T> {
        or_fail(name, self.register_single(name, value))
    }

    pub fn register_no_fill_or_fail<T: Injectable>(&self, name: &str, value: Option<T>) -> Arc<T> {
        or_fail(name, self.register_no_fill(name, value))
    }

    pub fn register_single_no_fill_or_fail<T: Injectable>(
        &self,
        name: &str,
        value: Option<T>,
    ) -> Arc<T> {
        or_fail(name, self.register_single_no_fill(name, value))
    }

    pub fn register_value_or_fail<V: Send + Sync + 'static>(&self, name: &str, value: V) {
        or_fail(name, self.register_value(name, value))
    }

    // ── Lookup ──

    /// Object registered under `name`.
    pub fn find(&self, name: &str) -> Option<Arc<Object>> {
        self.state.read().find(name)
    }

    /// Singleton struct reference of type `T`.
    pub fn find_by_type<T: Send + Sync + 'static>(&self) -> Option<Arc<Object>> {
        self.state.read().find_by_type(TypeRef::of_struct::<T>())
    }

    /// Shared instance of the struct reference registered under `name`.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.find(name)?.get::<T>()
    }

    pub fn get_by_type<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.find_by_type::<T>()?.get::<T>()
    }

    /// Copy of the value registered under `name`.
    pub fn get_value<V: Clone + 'static>(&self, name: &str) -> Option<V> {
        self.find(name)?.value::<V>()
    }

    /// The object under `name`, seen through interface `I`.
    pub fn get_interface<I: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<Arc<I>> {
        self.find(name)?.view::<I>()
    }

    /// Number of registry keys; a singleton struct reference counts twice.
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    // ── Introspection ──

    /// Every key with its object, in registration order.
    pub fn describe(&self) -> Vec<Entry> {
        introspect::describe(&self.state.read())
    }

    /// [`describe`](Self::describe) rendered as JSON.
    pub fn sprint(&self) -> String {
        introspect::sprint(&self.state.read())
    }

    /// Each object with the objects its tagged fields resolve to.
    pub fn print_tree(&self) -> String {
        introspect::tree(&self.state.read())
    }

    // ── Teardown ──

    /// Closes every closeable object in reverse registration order, then
    /// empties the registry.
    ///
    /// Each object is closed at most once, however many keys it has. A
    /// panicking close callback is logged and skipped.
    #[instrument(skip(self))]
    pub fn close(&self) {
        let mut registry = self.state.write();
        info!(keys = registry.len(), "Closing graph");
        if tracing::enabled!(Level::DEBUG) {
            debug!(objects = %introspect::sprint(&registry), "Objects before close");
        }

        let visited: Vec<(String, Arc<Object>)> = registry
            .iter()
            .rev()
            .map(|(key, object)| (key.to_string(), Arc::clone(object)))
            .collect();

        for (_, object) in &visited {
            let Some(closer) = object.closer() else {
                continue;
            };
            if !object.mark_closed() {
                continue;
            }
            let closer = Arc::clone(closer);
            match panic::catch_unwind(AssertUnwindSafe(|| closer.close())) {
                Ok(()) => debug!(object = %object, "Closed"),
                Err(payload) => error!(
                    object = %object,
                    panic = panic_message(payload.as_ref()),
                    "Close callback panicked"
                ),
            }
        }

        for (key, _) in &visited {
            registry.delete(key);
        }
        info!("Graph closed");
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("keys", &self.len())
            .field("slow_start_threshold", &self.settings.slow_start_threshold)
            .finish()
    }
}

fn or_fail<R>(name: &str, result: Result<R>) -> R {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!(name, error = %err, "Registration failed");
            panic!("{err}");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic>"
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
