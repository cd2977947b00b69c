use std::sync::Arc;

use rstest::{fixture, rstest};
use tether::{ConfigSource, Graph, GraphError, Injectable};

#[allow(non_snake_case)]
#[derive(Clone, ConfigSource)]
struct Config4T {
    Abc: i32,
    Def: String,
    Ghi: f64,
    #[config(rename = "jkl_path")]
    Jkl: Vec<String>,
    #[config(skip)]
    secret: String,
}

#[fixture]
fn config() -> Config4T {
    Config4T {
        Abc: 123,
        Def: "def".into(),
        Ghi: 1.5,
        Jkl: vec!["a".into(), "b".into()],
        secret: "hidden".into(),
    }
}

#[rstest]
fn entries_use_lowercase_names(config: Config4T) {
    let keys: Vec<String> = config.entries().iter().map(|e| e.key().to_string()).collect();
    assert_eq!(keys, ["abc", "def", "ghi", "jkl_path"]);
    assert!(!config.secret.is_empty());
}

#[rstest]
#[case("abc")]
#[case("def")]
#[case("ghi")]
#[case("jkl_path")]
fn every_entry_is_registered(config: Config4T, #[case] key: &str) {
    let graph = Graph::new();
    assert_eq!(graph.register_config(&config).unwrap(), 4);
    assert!(graph.find(key).is_some());
    assert!(graph.find("secret").is_none());
}

#[derive(Default, Injectable)]
struct Consumer {
    #[inject("abc")]
    abc: i64,
    #[inject("def")]
    def: String,
    #[inject("ghi")]
    ghi: f32,
    #[inject("jkl_path")]
    paths: Vec<String>,
}

#[rstest]
fn registered_config_is_injectable(config: Config4T) {
    let graph = Graph::new();
    graph.register_config(&config).unwrap();

    let consumer: Arc<Consumer> = graph.register("consumer", None).unwrap();
    assert_eq!(consumer.abc, 123);
    assert_eq!(consumer.def, "def");
    assert_eq!(consumer.ghi, 1.5);
    assert_eq!(consumer.paths, ["a", "b"]);
}

#[rstest]
fn duplicate_key_stops_registration(config: Config4T) {
    let graph = Graph::new();
    graph.register_value("def", String::from("taken")).unwrap();

    let err = graph.register_config(&config).unwrap_err();
    assert!(matches!(err, GraphError::AlreadyRegistered(_)));
    assert_eq!(graph.get_value::<i32>("abc"), Some(123));
    assert!(graph.find("ghi").is_none());
}
