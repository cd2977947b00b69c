//! Registration and recursive dependency resolution.
//!
//! A [`Resolution`] borrows the registry for the duration of one public
//! registration call. The graph takes its write lock once, builds a
//! resolution context on top of the guarded registry, and every nested
//! auto-creation goes through the same context without touching the lock.
//!
//! ```text
//! register_struct ──> wire fields ──> lookup ──(miss)──> auto-create ──┐
//!        │                 ▲                                           │
//!        │                 └──────────── register_struct <─────────────┘
//!        ▼
//!      start ──> commit (set / set_dual)
//! ```

use std::any::{Any, type_name};
use std::sync::Arc;
use std::time::Instant;

use tether_support::rendering::suggest_similar;
use tracing::{debug, trace, warn};

use crate::descriptor::{AutoCreate, DependencyTag, FieldDependency, FieldDescriptor, Injectable};
use crate::error::{
    AlreadyRegisteredError, CyclicDependencyError, DependencyNotFoundError, GraphError, Result,
};
use crate::graph::Settings;
use crate::implementation::ImplementationRegistry;
use crate::key::TypeRef;
use crate::object::Object;
use crate::registry::Registry;

/// Registers a fresh `T` under a name: `(context, name, singleton, skip_fill)`.
pub(crate) type CreateFn = fn(&mut Resolution<'_>, &str, bool, bool) -> Result<()>;

pub(crate) fn create_struct<T: Injectable>(
    cx: &mut Resolution<'_>,
    name: &str,
    singleton: bool,
    skip_fill: bool,
) -> Result<()> {
    cx.register_struct::<T>(name, None, singleton, skip_fill).map(|_| ())
}

/// Finds the object a tagged field refers to.
///
/// A named tag looks up by name, then (singleton struct references only)
/// by type. An unnamed tag looks up by type.
pub(crate) fn lookup(registry: &Registry, tag: &DependencyTag, declared: TypeRef) -> Option<Arc<Object>> {
    if tag.key.is_empty() {
        return registry.find_by_type(declared);
    }
    registry.find(&tag.key).or_else(|| {
        if tag.singleton && declared.is_struct_ref() {
            registry.find_by_type(declared)
        } else {
            None
        }
    })
}

/// Non-locking context for one registration and everything it auto-creates.
pub(crate) struct Resolution<'a> {
    registry: &'a mut Registry,
    settings: &'a Settings,
    implementations: &'a ImplementationRegistry,
    /// Names being built, outermost first.
    in_progress: Vec<String>,
}

impl<'a> Resolution<'a> {
    pub fn new(
        registry: &'a mut Registry,
        settings: &'a Settings,
        implementations: &'a ImplementationRegistry,
    ) -> Self {
        Self {
            registry,
            settings,
            implementations,
            in_progress: Vec::new(),
        }
    }

    /// Stores a value as-is. No field injection, no lifecycle hooks.
    pub fn register_value(
        &mut self,
        name: &str,
        type_ref: TypeRef,
        value: Box<dyn Any + Send + Sync>,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(GraphError::NameRequired {
                type_name: type_ref.canonical_name(),
            });
        }
        self.ensure_vacant(name, type_ref)?;
        self.commit(Object::from_value(name.to_string(), type_ref, value), false);
        Ok(())
    }

    /// Wires, starts and commits a struct reference.
    ///
    /// `provided == None` allocates `T::default()`. An empty `name`
    /// defaults to the canonical type name.
    pub fn register_struct<T: Injectable>(
        &mut self,
        name: &str,
        provided: Option<T>,
        singleton: bool,
        skip_fill: bool,
    ) -> Result<Arc<T>> {
        let type_ref = TypeRef::of_struct::<T>();
        let name = if name.is_empty() {
            type_ref.canonical_name().to_string()
        } else {
            name.to_string()
        };

        if let Some(pos) = self.in_progress.iter().position(|n| *n == name) {
            let mut chain = self.in_progress[pos..].to_vec();
            chain.push(name);
            return Err(GraphError::CyclicDependency(CyclicDependencyError { chain }));
        }
        self.ensure_vacant(&name, type_ref)?;

        let created = provided.is_none();
        let mut instance = provided.unwrap_or_default();
        let fields = T::fields();

        self.in_progress.push(name.clone());
        let wired = self.wire(&name, &mut instance, &fields, created, skip_fill);
        self.in_progress.pop();
        wired?;

        let value = Arc::new(instance);
        self.start::<T>(&name, &value)?;

        let object = Object::from_struct(
            name,
            Arc::clone(&value),
            T::views(&value),
            T::closeable(&value),
            dependencies(&fields),
        );
        self.commit(object, singleton);
        Ok(value)
    }

    fn wire<T: Injectable>(
        &mut self,
        name: &str,
        instance: &mut T,
        fields: &[FieldDescriptor<T>],
        created: bool,
        skip_fill: bool,
    ) -> Result<()> {
        if !created && skip_fill {
            trace!(name, "Provided instance left unfilled");
            return Ok(());
        }
        let owner = type_name::<T>();

        for field in fields {
            if let Some(slot) = field.slot()
                && !slot.is_zero(instance)
            {
                trace!(name, field = field.name(), "Field already set, skipped");
                continue;
            }

            let tag = DependencyTag::parse(field.tag()).map_err(|source| GraphError::TagParseFailure {
                field: field.name(),
                owner,
                source,
            })?;
            let Some(tag) = tag else {
                continue;
            };
            let Some(slot) = field.slot() else {
                return Err(GraphError::InvalidInjectionTarget {
                    field: field.name(),
                    owner,
                });
            };
            let declared = slot.declared();

            let found = match lookup(self.registry, &tag, declared) {
                Some(found) => found,
                None if tag.nilable => {
                    trace!(name, field = field.name(), "Nilable dependency absent, left empty");
                    continue;
                }
                None => {
                    self.auto_create(name, owner, field.name(), &tag, slot.auto_create(), declared, skip_fill)?;
                    lookup(self.registry, &tag, declared)
                        .ok_or_else(|| self.not_found(field.name(), &tag, declared, name, owner))?
                }
            };

            slot.assign(instance, &found).map_err(|_| GraphError::TypeMismatch {
                field: field.name(),
                owner,
                expected: declared.canonical_name(),
                found_name: found.name().to_string(),
                found: found.type_ref().canonical_name(),
            })?;
            trace!(name, field = field.name(), from = found.name(), "Injected");
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn auto_create(
        &mut self,
        owner_name: &str,
        owner: &'static str,
        field: &'static str,
        tag: &DependencyTag,
        strategy: AutoCreate,
        declared: TypeRef,
        skip_fill: bool,
    ) -> Result<()> {
        match strategy {
            AutoCreate::Struct(create) => {
                debug!(field, key = %tag.key, type_name = declared.canonical_name(), "Auto-creating dependency");
                create(self, &tag.key, tag.singleton, skip_fill)
            }
            AutoCreate::Interface => {
                // Candidates are listed by name; a by-type field has none.
                if tag.key.is_empty() {
                    return Err(self.not_found(field, tag, declared, owner_name, owner));
                }
                let implementations = self.implementations;
                let Some(candidate) = implementations.find(&tag.key, declared.type_id()) else {
                    debug!(
                        field,
                        key = %tag.key,
                        listed = ?implementations.listed(&tag.key),
                        "No listed implementation provides the interface"
                    );
                    return Err(self.not_found(field, tag, declared, owner_name, owner));
                };
                debug!(
                    field,
                    key = %tag.key,
                    implementation = candidate.type_name(),
                    "Auto-creating implementation"
                );
                (candidate.create_fn())(self, &tag.key, tag.singleton, skip_fill)
            }
            AutoCreate::Never => Err(self.not_found(field, tag, declared, owner_name, owner)),
        }
    }

    fn start<T: Injectable>(&self, name: &str, value: &Arc<T>) -> Result<()> {
        let Some(startable) = T::startable(value) else {
            return Ok(());
        };

        let began = Instant::now();
        let outcome = startable.start();
        let elapsed = began.elapsed();
        if elapsed > self.settings.slow_start_threshold {
            warn!(
                name,
                ?elapsed,
                threshold = ?self.settings.slow_start_threshold,
                "Slow start"
            );
        }

        outcome.map_err(|source| GraphError::StartFailed {
            name: name.to_string(),
            source,
        })
    }

    fn commit(&mut self, object: Object, singleton: bool) {
        let object = Arc::new(object);
        let name = object.name().to_string();
        debug!(
            name = %name,
            type_name = object.type_ref().canonical_name(),
            singleton,
            object = ?object,
            "Registered"
        );

        if singleton && object.type_ref().is_struct_ref() {
            if let Some(previous) = self.registry.set_dual(name, object) {
                warn!(
                    previous = previous.name(),
                    type_name = previous.type_ref().canonical_name(),
                    "Singleton type key taken over"
                );
            }
        } else {
            self.registry.set(name, object);
        }
    }

    fn ensure_vacant(&self, name: &str, type_ref: TypeRef) -> Result<()> {
        match self.registry.find(name) {
            Some(existing) => Err(GraphError::AlreadyRegistered(AlreadyRegisteredError {
                name: name.to_string(),
                type_name: type_ref.canonical_name(),
                existing: existing.type_ref().canonical_name(),
            })),
            None => Ok(()),
        }
    }

    fn not_found(
        &self,
        field: &'static str,
        tag: &DependencyTag,
        declared: TypeRef,
        owner_name: &str,
        owner: &'static str,
    ) -> GraphError {
        let suggestions = if tag.key.is_empty() {
            Vec::new()
        } else {
            suggest_similar(&tag.key, &self.registry.keys(), 3)
        };
        GraphError::DependencyNotFound(DependencyNotFoundError {
            field,
            tag: tag.key.clone(),
            dependency_type: declared.canonical_name(),
            owner_name: owner_name.to_string(),
            owner_type: owner,
            suggestions,
        })
    }
}

/// Tagged, writable fields of a struct, as recorded for tree printing.
fn dependencies<T>(fields: &[FieldDescriptor<T>]) -> Vec<FieldDependency> {
    fields
        .iter()
        .filter_map(|field| {
            let declared = field.declared()?;
            let tag = DependencyTag::parse(field.tag()).ok().flatten()?;
            Some(FieldDependency {
                field: field.name(),
                tag,
                declared,
            })
        })
        .collect()
}
