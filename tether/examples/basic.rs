//! Wires a handful of values and two structs, prints the graph, then closes it.
//!
//! ```sh
//! RUST_LOG=tether_graph=debug cargo run -p tether --example basic
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tether::{BoxError, Closeable, Injectable, Startable, global};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Injectable)]
#[tether(startable, closeable)]
struct Test {
    #[inject("target")]
    target: i64,
    #[inject("timeout")]
    timeout: i64,
    #[inject("path_string")]
    path_string: String,
    #[inject("path_strings")]
    path_strings: Vec<String>,
    #[inject("path_map")]
    path_map: HashMap<String, i32>,
}

impl Startable for Test {
    fn start(&self) -> Result<(), BoxError> {
        println!("start {}", self.target);
        Ok(())
    }
}

impl Closeable for Test {
    fn close(&self) {
        println!("close {}", self.target);
    }
}

#[derive(Debug, Default, Injectable)]
#[tether(closeable)]
struct Dep {
    #[inject("test")]
    test: Option<Arc<Test>>,
    #[inject("wait")]
    wait: i64,
}

impl Closeable for Dep {
    fn close(&self) {
        println!("close Dep {:?}", self.test);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    global::init_default();
    global::reg_value("target", 123i32);
    global::reg_value("wait", 123i32);
    global::reg_value("timeout", 123i32);
    global::reg_value("path_string", String::from("path string"));
    global::reg_value("path_strings", vec![String::from("path1"), String::from("path2")]);
    global::reg_value(
        "path_map",
        HashMap::from([(String::from("path1"), 1), (String::from("path2"), 2)]),
    );

    // `test` is created on demand and started before `dep` is registered.
    let dep = global::reg::<Dep>("dep", None);
    println!("find dep {dep:?}");

    println!("{}", global::graph_print());
    println!("{}", global::graph_print_tree());

    // Dep closes before Test.
    global::close();
}
