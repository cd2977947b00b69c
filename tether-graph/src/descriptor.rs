//! Field tables for injectable structs.
//!
//! Instead of inspecting types at runtime, every injectable struct hands
//! the engine a table of [`FieldDescriptor`]s: the field name, its raw tag
//! and a typed getter/setter pair. `#[derive(Injectable)]` writes the
//! table; it can also be written by hand.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use tether_graph::{FieldDescriptor, Graph, Injectable};
//!
//! #[derive(Default)]
//! struct Pool {
//!     size: i64,
//! }
//!
//! impl Injectable for Pool {
//!     fn fields() -> Vec<FieldDescriptor<Self>> {
//!         vec![FieldDescriptor::value(
//!             "size",
//!             r#"inject:"pool_size""#,
//!             |p: &Pool| &p.size,
//!             |p: &mut Pool| &mut p.size,
//!         )]
//!     }
//! }
//!
//! let graph = Graph::new();
//! graph.register_value("pool_size", 8i32).unwrap();
//! let pool: Arc<Pool> = graph.register("pool", None).unwrap();
//! assert_eq!(pool.size, 8);
//! ```

use std::any::TypeId;
use std::sync::Arc;

use tether_support::tag::{self, TagError};

use crate::assign::{self, AssignError};
use crate::key::TypeRef;
use crate::lifecycle::{Closeable, Startable};
use crate::object::{Object, View};
use crate::resolve::{CreateFn, create_struct};
use crate::zero::Zero;

/// A struct the graph can allocate, wire and manage.
///
/// Only [`fields`](Injectable::fields) is required. The lifecycle and
/// interface hooks default to "not supported".
pub trait Injectable: Default + Send + Sync + 'static {
    /// The struct's field table, in declaration order.
    fn fields() -> Vec<FieldDescriptor<Self>>;

    /// Start capability of a wired instance.
    fn startable(_this: &Arc<Self>) -> Option<Arc<dyn Startable>> {
        None
    }

    /// Close capability of a wired instance.
    fn closeable(_this: &Arc<Self>) -> Option<Arc<dyn Closeable>> {
        None
    }

    /// Interface views (`Arc<dyn Trait>`) the instance can be injected as.
    fn views(_this: &Arc<Self>) -> Vec<View> {
        Vec::new()
    }

    /// Whether the type has a view for the `Arc<dyn Trait>` with this id.
    fn provides(_interface: TypeId) -> bool {
        false
    }
}

/// Parsed dependency metadata of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTag {
    /// Lookup name; empty means "by type"
    pub key: String,
    /// Allow falling back to the type key, and dual-key auto-created objects
    pub singleton: bool,
    /// Leave the field at zero when nothing matches
    pub nilable: bool,
}

impl DependencyTag {
    /// Parses a raw tag. `Ok(None)` when the tag has no `inject` key.
    ///
    /// ```
    /// use tether_graph::descriptor::DependencyTag;
    ///
    /// let tag = DependencyTag::parse(r#"inject:"sin3" singleton:"true""#).unwrap().unwrap();
    /// assert_eq!(tag.key, "sin3");
    /// assert!(tag.singleton);
    /// assert!(!tag.nilable);
    ///
    /// assert!(DependencyTag::parse(r#"json:"name""#).unwrap().is_none());
    /// ```
    pub fn parse(raw: &str) -> Result<Option<Self>, TagError> {
        let Some(key) = tag::extract(raw, "inject")? else {
            return Ok(None);
        };
        Ok(Some(Self {
            key,
            singleton: tag::flag(raw, "singleton")?,
            nilable: tag::flag(raw, "cannil")? || tag::flag(raw, "nilable")?,
        }))
    }
}

/// A tagged field as recorded on a registered [`Object`].
#[derive(Debug, Clone)]
pub struct FieldDependency {
    pub field: &'static str,
    pub tag: DependencyTag,
    /// Declared type of the field's handle
    pub declared: TypeRef,
}

/// How a missing dependency may be synthesised.
#[derive(Clone, Copy)]
pub(crate) enum AutoCreate {
    /// Register a fresh instance of the field's struct type.
    Struct(CreateFn),
    /// Ask the implementation registry for a provider of the interface.
    Interface,
    /// Values cannot be made up.
    Never,
}

/// Typed access to one field of `S`.
pub(crate) trait Slot<S>: Send + Sync {
    fn declared(&self) -> TypeRef;
    fn is_zero(&self, owner: &S) -> bool;
    fn assign(&self, owner: &mut S, found: &Object) -> Result<(), AssignError>;
    fn auto_create(&self) -> AutoCreate;
}

/// One entry of an [`Injectable`] field table.
pub struct FieldDescriptor<S> {
    name: &'static str,
    tag: &'static str,
    slot: Option<Box<dyn Slot<S>>>,
}

impl<S: 'static> FieldDescriptor<S> {
    /// A field holding a struct reference: `Option<Arc<T>>`.
    ///
    /// Missing dependencies are auto-created.
    pub fn reference<T: Injectable>(
        name: &'static str,
        tag: &'static str,
        get: fn(&S) -> &Option<Arc<T>>,
        get_mut: fn(&mut S) -> &mut Option<Arc<T>>,
    ) -> Self {
        Self::with_slot(name, tag, ReferenceSlot { get, get_mut })
    }

    /// A field holding an interface: `Option<Arc<dyn Trait>>`.
    ///
    /// Missing dependencies are looked up in the implementation registry.
    pub fn interface<I: ?Sized + Send + Sync + 'static>(
        name: &'static str,
        tag: &'static str,
        get: fn(&S) -> &Option<Arc<I>>,
        get_mut: fn(&mut S) -> &mut Option<Arc<I>>,
    ) -> Self {
        Self::with_slot(name, tag, InterfaceSlot { get, get_mut })
    }

    /// A field holding a plain value, copied out of the registry.
    pub fn value<F: Zero + Clone + Send + Sync + 'static>(
        name: &'static str,
        tag: &'static str,
        get: fn(&S) -> &F,
        get_mut: fn(&mut S) -> &mut F,
    ) -> Self {
        Self::with_slot(name, tag, ValueSlot { get, get_mut })
    }

    /// A field the graph can see but not write.
    ///
    /// Tagging it is an injection error.
    pub fn read_only(name: &'static str, tag: &'static str) -> Self {
        Self { name, tag, slot: None }
    }

    fn with_slot(name: &'static str, tag: &'static str, slot: impl Slot<S> + 'static) -> Self {
        Self {
            name,
            tag,
            slot: Some(Box::new(slot)),
        }
    }
}

impl<S> FieldDescriptor<S> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raw tag text.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Declared type, `None` for read-only fields.
    pub fn declared(&self) -> Option<TypeRef> {
        self.slot.as_ref().map(|slot| slot.declared())
    }

    pub(crate) fn slot(&self) -> Option<&dyn Slot<S>> {
        self.slot.as_deref()
    }
}

impl<S> std::fmt::Debug for FieldDescriptor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("declared", &self.declared())
            .finish()
    }
}

struct ReferenceSlot<S, T> {
    get: fn(&S) -> &Option<Arc<T>>,
    get_mut: fn(&mut S) -> &mut Option<Arc<T>>,
}

impl<S, T: Injectable> Slot<S> for ReferenceSlot<S, T> {
    fn declared(&self) -> TypeRef {
        TypeRef::of_struct::<T>()
    }

    fn is_zero(&self, owner: &S) -> bool {
        (self.get)(owner).is_none()
    }

    fn assign(&self, owner: &mut S, found: &Object) -> Result<(), AssignError> {
        *(self.get_mut)(owner) = Some(assign::reference::<T>(found)?);
        Ok(())
    }

    fn auto_create(&self) -> AutoCreate {
        AutoCreate::Struct(create_struct::<T>)
    }
}

struct InterfaceSlot<S, I: ?Sized> {
    get: fn(&S) -> &Option<Arc<I>>,
    get_mut: fn(&mut S) -> &mut Option<Arc<I>>,
}

impl<S, I: ?Sized + Send + Sync + 'static> Slot<S> for InterfaceSlot<S, I> {
    fn declared(&self) -> TypeRef {
        TypeRef::of_interface::<I>()
    }

    fn is_zero(&self, owner: &S) -> bool {
        (self.get)(owner).is_none()
    }

    fn assign(&self, owner: &mut S, found: &Object) -> Result<(), AssignError> {
        *(self.get_mut)(owner) = Some(assign::interface::<I>(found)?);
        Ok(())
    }

    fn auto_create(&self) -> AutoCreate {
        AutoCreate::Interface
    }
}

struct ValueSlot<S, F> {
    get: fn(&S) -> &F,
    get_mut: fn(&mut S) -> &mut F,
}

impl<S, F: Zero + Clone + Send + Sync + 'static> Slot<S> for ValueSlot<S, F> {
    fn declared(&self) -> TypeRef {
        TypeRef::of_value::<F>()
    }

    fn is_zero(&self, owner: &S) -> bool {
        (self.get)(owner).is_zero()
    }

    fn assign(&self, owner: &mut S, found: &Object) -> Result<(), AssignError> {
        *(self.get_mut)(owner) = assign::value::<F>(found)?;
        Ok(())
    }

    fn auto_create(&self) -> AutoCreate {
        AutoCreate::Never
    }
}
