use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tether::{BoxError, Closeable, Graph, GraphError, Injectable, Startable, Zero};

/// Shared event log.
#[derive(Default, Injectable)]
struct Journal {
    entries: Mutex<Vec<String>>,
}

impl Journal {
    fn push(&self, entry: String) {
        self.entries.lock().push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

#[derive(Default, Injectable)]
struct T {
    #[inject("target")]
    x: i64,
}

#[test]
fn value_is_injected_by_name() {
    let graph = Graph::new();
    graph.register_value("target", 123).unwrap();
    graph.register::<T>("t", None).unwrap();

    assert_eq!(graph.get::<T>("t").unwrap().x, 123);
}

#[derive(Debug, Default, Injectable)]
struct A {
    #[inject("missing")]
    needed: String,
}

#[test]
fn unresolved_dependency_names_field_and_owner() {
    let graph = Graph::new();
    let err = graph.register::<A>("a", None).unwrap_err();

    match &err {
        GraphError::DependencyNotFound(e) => {
            assert_eq!(e.field, "needed");
            assert_eq!(e.tag, "missing");
            assert_eq!(e.owner_name, "a");
            assert!(e.owner_type.ends_with("::A"));
        }
        other => panic!("Expected DependencyNotFound, got: {other:?}"),
    }
    assert!(err.to_string().contains("Hint:"));
    assert!(graph.find("a").is_none());
}

#[derive(Default, Injectable)]
struct S1 {
    name: String,
}

#[derive(Default, Injectable)]
struct S2 {
    #[inject("sin1", singleton)]
    r: Option<Arc<S1>>,
}

#[test]
fn singleton_reference_is_shared() {
    let graph = Graph::new();
    graph
        .register_single("sin1", Some(S1 { name: "s1".into() }))
        .unwrap();
    let s = graph.register::<S2>("s", None).unwrap();

    let sin1 = graph.get::<S1>("sin1").unwrap();
    assert!(Arc::ptr_eq(s.r.as_ref().unwrap(), &sin1));
    assert!(Arc::ptr_eq(&graph.get_by_type::<S1>().unwrap(), &sin1));
    assert_eq!(sin1.name, "s1");
}

#[test]
fn instance_is_stable_until_teardown() {
    let graph = Graph::new();
    let first = graph.register("sin1", Some(S1 { name: "a".into() })).unwrap();

    for _ in 0..3 {
        assert!(Arc::ptr_eq(&graph.get::<S1>("sin1").unwrap(), &first));
    }
    graph.close();
    assert!(graph.get::<S1>("sin1").is_none());
}

trait Sender: Send + Sync {
    fn send(&self, to: &str) -> String;
}

#[derive(Default, Injectable)]
#[tether(provides(Sender))]
struct Smtp {
    #[inject("smtp_host")]
    host: String,
}

impl Sender for Smtp {
    fn send(&self, to: &str) -> String {
        format!("{to} via {}", self.host)
    }
}

tether::implementation!("mailer" => Smtp);

#[derive(Default, Injectable)]
struct Pool {
    #[inject("pool_size")]
    size: u32,
}

#[derive(Default, Injectable)]
struct Notifier {
    #[inject("mailer")]
    sender: Option<Arc<dyn Sender>>,
    #[inject(singleton)]
    pool: Option<Arc<Pool>>,
    #[inject("retries", nilable)]
    retries: u8,
}

#[test]
fn missing_dependencies_are_created() {
    let graph = Graph::new();
    graph.register_value("smtp_host", String::from("mail.local")).unwrap();
    graph.register_value("pool_size", 4u64).unwrap();

    let notifier = graph.register::<Notifier>("notifier", None).unwrap();

    assert_eq!(notifier.sender.as_ref().unwrap().send("ops"), "ops via mail.local");
    assert_eq!(notifier.pool.as_ref().unwrap().size, 4);
    assert_eq!(notifier.retries, 0);

    let pool = graph.get_by_type::<Pool>().unwrap();
    assert!(Arc::ptr_eq(notifier.pool.as_ref().unwrap(), &pool));
    assert!(graph.get::<Smtp>("mailer").is_some());
    assert!(graph.get_interface::<dyn Sender>("mailer").is_some());
}

#[test]
fn builder_implementation_wins_over_linked() {
    #[derive(Default, Injectable)]
    #[tether(provides(Sender))]
    struct Sms;

    impl Sender for Sms {
        fn send(&self, to: &str) -> String {
            format!("sms to {to}")
        }
    }

    let graph = Graph::builder().implementation::<Sms>("mailer").build();
    graph.register_value("pool_size", 1u32).unwrap();

    let notifier = graph.register::<Notifier>("notifier", None).unwrap();
    assert_eq!(notifier.sender.as_ref().unwrap().send("ops"), "sms to ops");
}

#[test]
fn linked_implementations_can_be_ignored() {
    let graph = Graph::builder().use_inventory(false).build();
    match graph.register::<Notifier>("notifier", None) {
        Err(GraphError::DependencyNotFound(e)) => assert_eq!(e.field, "sender"),
        other => panic!("Expected DependencyNotFound, got: {:?}", other.map(|_| ())),
    }
}

#[derive(Default, Injectable)]
#[tether(startable, closeable)]
struct Service {
    #[inject("journal")]
    journal: Option<Arc<Journal>>,
    #[inject("label")]
    label: String,
}

impl Service {
    fn record(&self, event: &str) {
        if let Some(journal) = &self.journal {
            journal.push(format!("{event} {}", self.label));
        }
    }
}

impl Startable for Service {
    fn start(&self) -> Result<(), BoxError> {
        self.record("start");
        Ok(())
    }
}

impl Closeable for Service {
    fn close(&self) {
        self.record("close");
    }
}

#[derive(Default, Injectable)]
#[tether(closeable)]
struct Front {
    #[inject("backend")]
    backend: Option<Arc<Service>>,
}

impl Closeable for Front {
    fn close(&self) {
        if let Some(backend) = &self.backend {
            backend.record("close front of");
        }
    }
}

#[test]
fn dependents_close_before_dependencies() {
    let graph = Graph::new();
    let journal = graph.register_single::<Journal>("journal", None).unwrap();
    graph.register_value("label", String::from("backend")).unwrap();

    // `backend` is auto-created while wiring `front`.
    graph.register::<Front>("front", None).unwrap();
    graph.close();

    assert_eq!(
        journal.entries(),
        vec!["start backend", "close front of backend", "close backend"]
    );
    assert!(graph.is_empty());
}

#[derive(Debug, Clone, Default, PartialEq, Zero)]
struct Dep {
    data: Vec<String>,
    data2: HashMap<String, i32>,
}

#[derive(Default, Injectable)]
struct TestDepStruct {
    #[inject("dep")]
    dep: Dep,
}

#[test]
fn struct_values_are_copied() {
    let graph = Graph::new();
    let dep = Dep {
        data2: HashMap::from([("abc".to_string(), 123)]),
        ..Dep::default()
    };
    graph.register_value("dep", dep.clone()).unwrap();

    let tds = graph.register::<TestDepStruct>("testDepStruct", None).unwrap();
    assert_eq!(tds.dep, dep);
    assert_eq!(tds.dep.data2["abc"], 123);
}

#[test]
fn empty_struct_value_is_still_injected() {
    let graph = Graph::new();
    graph.register_value("dep", Dep::default()).unwrap();

    let tds = graph.register::<TestDepStruct>("testDepStruct", None).unwrap();
    assert!(tds.dep.data.is_empty());
}

#[test]
fn struct_value_must_be_registered() {
    let graph = Graph::new();
    assert!(graph.register::<TestDepStruct>("testDepStruct", None).is_err());
}

#[test]
fn derived_zero_checks_every_field() {
    assert!(Dep::default().is_zero());
    let dep = Dep {
        data: vec!["abc".into()],
        ..Dep::default()
    };
    assert!(!dep.is_zero());
}
