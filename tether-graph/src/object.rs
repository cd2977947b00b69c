//! Object descriptors: the registry's unit of storage.
//!
//! An [`Object`] is created once, during registration, and shared by
//! every registry key that points at it (a singleton struct reference is
//! reachable under its name *and* its canonical type name).

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::descriptor::FieldDependency;
use crate::key::{Shape, TypeRef};
use crate::lifecycle::Closeable;

/// An `Arc<dyn Trait>` view of a registered object.
///
/// Lets an interface-typed field (`Option<Arc<dyn Trait>>`) receive an
/// object that was registered as its concrete struct.
pub struct View {
    type_id: TypeId,
    handle: Box<dyn Any + Send + Sync>,
}

impl View {
    /// Wraps `value` as a view of interface `I`.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use tether_graph::View;
    ///
    /// trait Greeter: Send + Sync {}
    /// struct English;
    /// impl Greeter for English {}
    ///
    /// let view = View::of::<dyn Greeter>(Arc::new(English));
    /// assert!(view.is::<dyn Greeter>());
    /// ```
    pub fn of<I: ?Sized + Send + Sync + 'static>(value: Arc<I>) -> Self {
        Self {
            type_id: TypeId::of::<Arc<I>>(),
            handle: Box::new(value),
        }
    }

    /// `true` if this is a view of interface `I`.
    pub fn is<I: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<Arc<I>>()
    }

    fn get<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<I>> {
        self.handle.downcast_ref::<Arc<I>>().cloned()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View").field("type_id", &self.type_id).finish()
    }
}

/// A named, typed, valued, lifecycle-tracked record.
pub struct Object {
    name: String,
    type_ref: TypeRef,
    value: Box<dyn Any + Send + Sync>,
    identity: Option<usize>,
    views: Vec<View>,
    closer: Option<Arc<dyn Closeable>>,
    dependencies: Vec<FieldDependency>,
    closed: AtomicBool,
}

impl Object {
    /// Descriptor for a wired struct reference.
    pub(crate) fn from_struct<T: Send + Sync + 'static>(
        name: String,
        value: Arc<T>,
        views: Vec<View>,
        closer: Option<Arc<dyn Closeable>>,
        dependencies: Vec<FieldDependency>,
    ) -> Self {
        Self {
            name,
            type_ref: TypeRef::of_struct::<T>(),
            identity: Some(Arc::as_ptr(&value) as usize),
            value: Box::new(value),
            views,
            closer,
            dependencies,
            closed: AtomicBool::new(false),
        }
    }

    /// Descriptor for a value stored as-is.
    pub(crate) fn from_value(
        name: String,
        type_ref: TypeRef,
        value: Box<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            name,
            type_ref,
            value,
            identity: None,
            views: Vec::new(),
            closer: None,
            dependencies: Vec::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Name the object was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    /// Type-erased handle: `Arc<T>` for struct references, the value itself otherwise.
    pub fn handle(&self) -> &(dyn Any + Send + Sync) {
        self.value.as_ref()
    }

    /// Borrows the handle as `H`.
    pub fn downcast_ref<H: 'static>(&self) -> Option<&H> {
        self.value.downcast_ref::<H>()
    }

    /// The shared instance of a struct reference.
    ///
    /// Every call returns the same `Arc` (pointer-equal).
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.downcast_ref::<Arc<T>>().cloned()
    }

    /// A copy of a stored value.
    pub fn value<V: Clone + 'static>(&self) -> Option<V> {
        self.downcast_ref::<V>().cloned()
    }

    /// The object seen through interface `I`.
    ///
    /// Succeeds when the handle itself is an `Arc<I>` or when the
    /// registered type declared a view of `I`.
    pub fn view<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<I>> {
        self.downcast_ref::<Arc<I>>()
            .cloned()
            .or_else(|| self.views.iter().find(|v| v.is::<I>()).and_then(View::get::<I>))
    }

    /// Opaque identity token: the instance address of a struct reference.
    pub fn identity(&self) -> Option<String> {
        self.identity.map(|addr| format!("{addr:#x}"))
    }

    /// Tagged fields of a struct reference, as resolved at registration.
    pub fn dependencies(&self) -> &[FieldDependency] {
        &self.dependencies
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn is_closeable(&self) -> bool {
        self.closer.is_some()
    }

    pub(crate) fn closer(&self) -> Option<&Arc<dyn Closeable>> {
        self.closer.as_ref()
    }

    /// Flips `closed` to true. Returns `false` if it already was.
    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Object");
        s.field("name", &self.name).field("type", &self.type_ref);
        if self.type_ref.shape() == Shape::Struct {
            s.field("identity", &self.identity());
        }
        s.field("closed", &self.is_closed()).finish()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identity() {
            Some(id) => write!(f, "{} ({} @ {id})", self.name, self.type_ref),
            None => write!(f, "{} ({})", self.name, self.type_ref),
        }
    }
}
