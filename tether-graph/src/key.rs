//! Type references.
//!
//! A [`TypeRef`] identifies the *handle* type stored for a registered
//! object: `Arc<T>` for an injectable struct, `Arc<dyn Trait>` for an
//! interface, or the value type itself. Its canonical name is the
//! secondary registry key used by singleton struct references.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// How values of a type take part in injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `Arc<T>` handle to an injectable struct.
    ///
    /// Eligible for field injection, lazy auto-creation and dual-key
    /// singleton storage.
    Struct,
    /// `Arc<dyn Trait>` handle to some implementation.
    Interface,
    /// Anything else: scalars, strings, collections, plain struct values.
    Value,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Struct => write!(f, "struct"),
            Shape::Interface => write!(f, "interface"),
            Shape::Value => write!(f, "value"),
        }
    }
}

/// Describes the static type of a registered value or injected field.
///
/// # Examples
/// ```
/// use tether_graph::key::{Shape, TypeRef};
///
/// struct Database;
///
/// let db = TypeRef::of_struct::<Database>();
/// assert_eq!(db.shape(), Shape::Struct);
/// assert!(db.canonical_name().starts_with("alloc::sync::Arc<"));
///
/// let port = TypeRef::of_value::<u16>();
/// assert_eq!(port.canonical_name(), "u16");
/// ```
#[derive(Clone, Copy)]
pub struct TypeRef {
    type_id: TypeId,
    canonical: &'static str,
    shape: Shape,
}

impl TypeRef {
    /// Reference to an injectable struct `T`, held as `Arc<T>`.
    #[inline]
    pub fn of_struct<T: Send + Sync + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<Arc<T>>(),
            canonical: type_name::<Arc<T>>(),
            shape: Shape::Struct,
        }
    }

    /// Reference to an interface `I`, held as `Arc<I>` (usually `Arc<dyn Trait>`).
    #[inline]
    pub fn of_interface<I: ?Sized + Send + Sync + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<Arc<I>>(),
            canonical: type_name::<Arc<I>>(),
            shape: Shape::Interface,
        }
    }

    /// A plain value type stored as-is.
    #[inline]
    pub fn of_value<V: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<V>(),
            canonical: type_name::<V>(),
            shape: Shape::Value,
        }
    }

    /// [`TypeId`] of the handle type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified name of the handle type.
    #[inline]
    pub fn canonical_name(&self) -> &'static str {
        self.canonical
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// `true` for `Arc<T>` handles to injectable structs.
    #[inline]
    pub fn is_struct_ref(&self) -> bool {
        self.shape == Shape::Struct
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({}, {})", self.canonical, self.shape)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical)
    }
}
