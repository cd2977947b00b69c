//! Implementation registry: candidates for interface auto-creation.
//!
//! When an interface field (`Option<Arc<dyn Trait>>`) finds nothing in the
//! graph, the engine asks this registry for the concrete types listed under
//! the field's tag name and registers the first one that provides the
//! interface.
//!
//! Entries come from two places:
//! - the [`GraphBuilder`](crate::GraphBuilder), consulted first;
//! - link-time submissions via the [`implementation!`](crate::implementation) macro.
//!
//! # Examples
//! ```
//! use std::any::TypeId;
//! use std::sync::Arc;
//! use tether_graph::{FieldDescriptor, Implementation, Injectable, View};
//!
//! trait Sender: Send + Sync {}
//!
//! #[derive(Default)]
//! struct SmtpSender;
//! impl Sender for SmtpSender {}
//!
//! impl Injectable for SmtpSender {
//!     fn fields() -> Vec<FieldDescriptor<Self>> {
//!         Vec::new()
//!     }
//!     fn views(this: &Arc<Self>) -> Vec<View> {
//!         vec![View::of::<dyn Sender>(this.clone())]
//!     }
//!     fn provides(interface: TypeId) -> bool {
//!         interface == TypeId::of::<Arc<dyn Sender>>()
//!     }
//! }
//!
//! tether_graph::implementation!("mailer" => SmtpSender);
//!
//! let entry = Implementation::of::<SmtpSender>("mailer");
//! assert_eq!(entry.key(), "mailer");
//! assert!(entry.provides(TypeId::of::<Arc<dyn Sender>>()));
//! ```

use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::fmt;

use crate::descriptor::Injectable;
use crate::resolve::{CreateFn, create_struct};

/// One candidate concrete type listed under a lookup key.
pub struct Implementation {
    key: Cow<'static, str>,
    type_name: fn() -> &'static str,
    provides: fn(TypeId) -> bool,
    create: CreateFn,
}

impl Implementation {
    /// Candidate `T` under `key`. Usable in `static`/`inventory` contexts.
    pub const fn of<T: Injectable>(key: &'static str) -> Self {
        Self {
            key: Cow::Borrowed(key),
            type_name: type_name::<T>,
            provides: T::provides,
            create: create_struct::<T>,
        }
    }

    /// Candidate `T` under a runtime key.
    pub fn named<T: Injectable>(key: impl Into<Cow<'static, str>>) -> Self {
        Self {
            key: key.into(),
            ..Self::of::<T>("")
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name of the concrete type.
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Whether the concrete type can be viewed as the interface handle
    /// with this [`TypeId`] (`TypeId::of::<Arc<dyn Trait>>()`).
    pub fn provides(&self, interface: TypeId) -> bool {
        (self.provides)(interface)
    }

    pub(crate) fn create_fn(&self) -> CreateFn {
        self.create
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("key", &self.key)
            .field("type", &self.type_name())
            .finish()
    }
}

inventory::collect!(Implementation);

/// Submits an [`Implementation`] at link time.
///
/// ```ignore
/// tether::implementation!("mailer" => SmtpSender);
/// ```
#[macro_export]
macro_rules! implementation {
    ($key:expr => $ty:ty) => {
        $crate::__private::inventory::submit! {
            $crate::Implementation::of::<$ty>($key)
        }
    };
}

/// Ordered candidate lists, explicit entries before linked ones.
#[derive(Debug)]
pub struct ImplementationRegistry {
    explicit: Vec<Implementation>,
    use_inventory: bool,
}

impl Default for ImplementationRegistry {
    fn default() -> Self {
        Self {
            explicit: Vec::new(),
            use_inventory: true,
        }
    }
}

impl ImplementationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an explicit candidate.
    pub fn add(&mut self, implementation: Implementation) {
        self.explicit.push(implementation);
    }

    /// Whether `implementation!` submissions are consulted.
    pub fn set_use_inventory(&mut self, enabled: bool) {
        self.use_inventory = enabled;
    }

    /// Candidates listed under `key`, in lookup order.
    pub fn candidates<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Implementation> + 'a {
        let enabled = self.use_inventory;
        let linked = inventory::iter::<Implementation>
            .into_iter()
            .filter(move |_| enabled)
            .map(|entry| -> &'a Implementation { entry });

        self.explicit
            .iter()
            .chain(linked)
            .filter(move |candidate| candidate.key() == key)
    }

    /// First candidate under `key` that provides `interface`.
    pub fn find<'a>(&'a self, key: &'a str, interface: TypeId) -> Option<&'a Implementation> {
        self.candidates(key).find(|candidate| candidate.provides(interface))
    }

    /// Candidate type names under `key`, for error messages.
    pub fn listed(&self, key: &str) -> Vec<&'static str> {
        self.candidates(key).map(Implementation::type_name).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::descriptor::FieldDescriptor;
    use crate::object::View;

    trait Sender: Send + Sync {}
    trait Store: Send + Sync {}

    #[derive(Default)]
    struct Smtp;
    impl Sender for Smtp {}

    #[derive(Default)]
    struct Disk;
    impl Store for Disk {}

    impl Injectable for Smtp {
        fn fields() -> Vec<FieldDescriptor<Self>> {
            Vec::new()
        }
        fn views(this: &Arc<Self>) -> Vec<View> {
            vec![View::of::<dyn Sender>(this.clone())]
        }
        fn provides(interface: TypeId) -> bool {
            interface == TypeId::of::<Arc<dyn Sender>>()
        }
    }

    impl Injectable for Disk {
        fn fields() -> Vec<FieldDescriptor<Self>> {
            Vec::new()
        }
        fn provides(interface: TypeId) -> bool {
            interface == TypeId::of::<Arc<dyn Store>>()
        }
    }

    crate::implementation!("linked.sender" => Smtp);

    #[test]
    fn first_providing_candidate_wins() {
        let mut registry = ImplementationRegistry::new();
        registry.add(Implementation::named::<Disk>("backend"));
        registry.add(Implementation::named::<Smtp>("backend"));

        let found = registry.find("backend", TypeId::of::<Arc<dyn Sender>>()).unwrap();
        assert!(found.type_name().ends_with("Smtp"));
        assert_eq!(registry.listed("backend").len(), 2);
    }

    #[test]
    fn unknown_key_has_no_candidates() {
        let registry = ImplementationRegistry::new();
        assert!(registry.find("nothing", TypeId::of::<Arc<dyn Store>>()).is_none());
    }

    #[test]
    fn linked_entries_can_be_disabled() {
        let mut registry = ImplementationRegistry::new();
        let sender = TypeId::of::<Arc<dyn Sender>>();
        assert!(registry.find("linked.sender", sender).is_some());

        registry.set_use_inventory(false);
        assert!(registry.find("linked.sender", sender).is_none());
    }
}
