//! Object registry: the ordered `name → Object` map a graph owns.
//!
//! Insertion order is registration order; teardown walks it backwards.
//! A singleton struct reference sits under two keys (its name and its
//! canonical type name) that share one `Arc<Object>`.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::key::TypeRef;
use crate::object::Object;

/// Stores registered objects in registration order.
///
/// Not synchronised itself; [`Graph`](crate::Graph) wraps it in a lock.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    named: IndexMap<String, Arc<Object>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an object by key.
    pub fn find(&self, name: &str) -> Option<Arc<Object>> {
        let found = self.named.get(name).cloned();
        trace!(key = name, found = found.is_some(), "Registry lookup");
        found
    }

    /// Looks up an object by the canonical name of `type_ref`.
    ///
    /// Only singleton struct references are stored under that key.
    pub fn find_by_type(&self, type_ref: TypeRef) -> Option<Arc<Object>> {
        self.find(type_ref.canonical_name())
    }

    /// Stores `object` under `name`.
    pub fn set(&mut self, name: String, object: Arc<Object>) {
        self.named.insert(name, object);
    }

    /// Stores a struct reference under `name` and under its canonical type name.
    ///
    /// An object registered *by* its type name keeps that key. Otherwise
    /// the newcomer takes the type key over and the previous holder is
    /// returned.
    pub fn set_dual(&mut self, name: String, object: Arc<Object>) -> Option<Arc<Object>> {
        let type_key = object.type_ref().canonical_name();
        self.named.insert(name, Arc::clone(&object));
        if !object.type_ref().is_struct_ref() {
            return None;
        }
        match self.named.get(type_key) {
            Some(held) if held.name() == type_key => None,
            _ => self
                .named
                .insert(type_key.to_string(), Arc::clone(&object))
                .filter(|previous| !Arc::ptr_eq(previous, &object)),
        }
    }

    /// Removes a key, keeping the order of the rest.
    pub fn delete(&mut self, name: &str) -> Option<Arc<Object>> {
        self.named.shift_remove(name)
    }

    /// Entries in registration order; `.rev()` for teardown order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Arc<Object>)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All keys, in registration order.
    pub fn keys(&self) -> Vec<&str> {
        self.named.keys().map(String::as_str).collect()
    }

    /// Number of keys (a singleton counts twice).
    pub fn len(&self) -> usize {
        self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Database;

    fn value(name: &str, v: i32) -> Arc<Object> {
        Arc::new(Object::from_value(name.into(), TypeRef::of_value::<i32>(), Box::new(v)))
    }

    fn database(name: &str) -> Arc<Object> {
        Arc::new(Object::from_struct(name.into(), Arc::new(Database), vec![], None, vec![]))
    }

    #[test]
    fn set_and_find() {
        let mut reg = Registry::new();
        reg.set("timeout".into(), value("timeout", 30));
        assert_eq!(reg.find("timeout").unwrap().value::<i32>(), Some(30));
        assert!(reg.find("missing").is_none());
    }

    #[test]
    fn dual_keys_share_the_object() {
        let mut reg = Registry::new();
        let db = database("db");
        assert!(reg.set_dual("db".into(), db.clone()).is_none());

        let by_name = reg.find("db").unwrap();
        let by_type = reg.find_by_type(TypeRef::of_struct::<Database>()).unwrap();
        assert!(Arc::ptr_eq(&by_name, &by_type));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn dual_key_under_type_name_is_one_entry() {
        let mut reg = Registry::new();
        let key = TypeRef::of_struct::<Database>().canonical_name().to_string();
        reg.set_dual(key, database("db"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn second_singleton_takes_type_key() {
        let mut reg = Registry::new();
        let first = database("primary");
        reg.set_dual("primary".into(), first.clone());
        let displaced = reg.set_dual("replica".into(), database("replica")).unwrap();
        assert!(Arc::ptr_eq(&displaced, &first));
        assert_eq!(reg.find_by_type(TypeRef::of_struct::<Database>()).unwrap().name(), "replica");
    }

    #[test]
    fn type_key_owned_by_name_is_kept() {
        let mut reg = Registry::new();
        let key = TypeRef::of_struct::<Database>().canonical_name().to_string();
        reg.set(key.clone(), database(&key));
        assert!(reg.set_dual("replica".into(), database("replica")).is_none());
        assert_eq!(reg.find(&key).unwrap().name(), key);
    }

    #[test]
    fn order_survives_deletes() {
        let mut reg = Registry::new();
        for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
            reg.set(name.into(), value(name, i as i32));
        }
        reg.delete("b");
        assert_eq!(reg.keys(), vec!["a", "c"]);
        let reversed: Vec<&str> = reg.iter().rev().map(|(k, _)| k).collect();
        assert_eq!(reversed, vec!["c", "a"]);
    }
}
