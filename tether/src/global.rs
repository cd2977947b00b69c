//! Process-wide graph.
//!
//! A thin layer of free functions over one shared [`Graph`]. Everything
//! here delegates to the graph returned by [`graph()`]; code that can pass
//! a `Graph` around should do that instead.
//!
//! ```
//! use tether::global;
//!
//! global::init_default();
//! global::register_value("timeout", 30u64).unwrap();
//! assert_eq!(global::graph_len(), 1);
//! global::close();
//! assert_eq!(global::graph_len(), 0);
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use tether_graph::{Graph, Injectable, Object, Result};

static GRAPH: Lazy<RwLock<Arc<Graph>>> = Lazy::new(|| RwLock::new(Arc::new(Graph::new())));

/// The current global graph.
pub fn graph() -> Arc<Graph> {
    GRAPH.read().clone()
}

/// Replaces the global graph with a fresh default one.
///
/// The previous graph is dropped without being closed.
pub fn init_default() {
    init(Graph::new());
}

/// Replaces the global graph with `graph`.
pub fn init(graph: Graph) {
    *GRAPH.write() = Arc::new(graph);
    debug!("Global graph replaced");
}

/// Closes every object of the global graph in reverse order.
pub fn close() {
    graph().close();
}

pub fn register<T: Injectable>(name: &str, value: Option<T>) -> Result<Arc<T>> {
    graph().register(name, value)
}

pub fn register_single<T: Injectable>(name: &str, value: Option<T>) -> Result<Arc<T>> {
    graph().register_single(name, value)
}

pub fn register_value<V: Send + Sync + 'static>(name: &str, value: V) -> Result<()> {
    graph().register_value(name, value)
}

/// Registers without wiring a provided instance's fields.
pub fn register_no_fill<T: Injectable>(name: &str, value: Option<T>) -> Result<Arc<T>> {
    graph().register_no_fill(name, value)
}

pub fn register_single_no_fill<T: Injectable>(name: &str, value: Option<T>) -> Result<Arc<T>> {
    graph().register_single_no_fill(name, value)
}

/// Registers a struct reference or panics; returns the wired instance.
pub fn reg<T: Injectable>(name: &str, value: Option<T>) -> Arc<T> {
    graph().register_or_fail(name, value)
}

/// Registers a singleton struct reference or panics.
pub fn reg_single<T: Injectable>(name: &str, value: Option<T>) -> Arc<T> {
    graph().register_single_or_fail(name, value)
}

/// Registers a value or panics.
pub fn reg_value<V: Send + Sync + 'static>(name: &str, value: V) {
    graph().register_value_or_fail(name, value);
}

pub fn find(name: &str) -> Option<Arc<Object>> {
    graph().find(name)
}

pub fn find_by_type<T: Send + Sync + 'static>() -> Option<Arc<Object>> {
    graph().find_by_type::<T>()
}

pub fn graph_len() -> usize {
    graph().len()
}

/// JSON listing of every key.
pub fn graph_print() -> String {
    graph().sprint()
}

pub fn graph_print_tree() -> String {
    graph().print_tree()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_graph::FieldDescriptor;

    #[derive(Default)]
    struct Test1 {
        conf: String,
    }

    impl Injectable for Test1 {
        fn fields() -> Vec<FieldDescriptor<Self>> {
            vec![FieldDescriptor::value(
                "conf",
                r#"inject:"conf""#,
                |t: &Test1| &t.conf,
                |t: &mut Test1| &mut t.conf,
            )]
        }
    }

    // One test: the global graph is shared by every test in this binary.
    #[test]
    fn facade_round_trip() {
        init_default();
        assert!(register::<Test1>("test1", None).is_err());

        reg_value("conf", String::from("##conf1"));
        let t1 = reg::<Test1>("test1", None);
        assert_eq!(t1.conf, "##conf1");
        assert!(Arc::ptr_eq(&find("test1").unwrap().get::<Test1>().unwrap(), &t1));
        assert!(find_by_type::<Test1>().is_none());

        let single = register_single::<Test1>("", None).unwrap();
        assert!(Arc::ptr_eq(&find_by_type::<Test1>().unwrap().get::<Test1>().unwrap(), &single));

        assert_eq!(graph_len(), 3);
        assert!(graph_print().starts_with('['));
        assert!(graph_print_tree().contains("test1 (Arc<Test1>)"));

        close();
        assert_eq!(graph_len(), 0);

        // Provided instances keep their fields; no "conf" is registered now.
        let kept = register_no_fill("kept", Some(Test1 { conf: "own".into() })).unwrap();
        assert_eq!(kept.conf, "own");
        let shared = register_single_no_fill("shared", Some(Test1 { conf: "one".into() })).unwrap();
        assert!(Arc::ptr_eq(&find_by_type::<Test1>().unwrap().get::<Test1>().unwrap(), &shared));
        close();

        reg_value("conf", String::from("##conf2"));
        let single = reg_single::<Test1>("single", None);
        assert_eq!(single.conf, "##conf2");
        assert!(Arc::ptr_eq(&find_by_type::<Test1>().unwrap().get::<Test1>().unwrap(), &single));
        close();

        init(Graph::builder().use_inventory(false).build());
        register_value("x", 1u8).unwrap();
        assert_eq!(graph().get_value::<u8>("x"), Some(1));
    }
}
