//! Read-only views of a graph: key listing, JSON dump and dependency tree.

use std::sync::Arc;

use serde::Serialize;
use tether_support::rendering::{TreeNode, render_tree, shorten_type_name};

use crate::object::Object;
use crate::registry::Registry;
use crate::resolve::lookup;

/// One registry key and the object behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub key: String,
    pub object: ObjectSummary,
}

/// Serializable summary of an [`Object`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Identity token of a struct reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl From<&Object> for ObjectSummary {
    fn from(object: &Object) -> Self {
        Self {
            name: object.name().to_string(),
            type_name: object.type_ref().canonical_name().to_string(),
            value: object.identity(),
        }
    }
}

pub(crate) fn describe(registry: &Registry) -> Vec<Entry> {
    registry
        .iter()
        .map(|(key, object)| Entry {
            key: key.to_string(),
            object: ObjectSummary::from(object.as_ref()),
        })
        .collect()
}

pub(crate) fn sprint(registry: &Registry) -> String {
    // Entries hold only strings; serialization cannot fail.
    serde_json::to_string(&describe(registry)).unwrap_or_else(|_| String::from("[]"))
}

/// One root per object (alias keys skipped), children re-resolved by tag.
pub(crate) fn tree(registry: &Registry) -> String {
    let roots: Vec<TreeNode> = registry
        .iter()
        .filter(|(key, object)| *key == object.name())
        .map(|(_, object)| node(registry, object, None, &mut Vec::new()))
        .collect();
    render_tree(&roots)
}

fn node(registry: &Registry, object: &Arc<Object>, field: Option<&str>, branch: &mut Vec<String>) -> TreeNode {
    let summary = format!(
        "{} ({})",
        object.name(),
        shorten_type_name(object.type_ref().canonical_name())
    );
    let label = match field {
        Some(field) => format!("{field}: {summary}"),
        None => summary,
    };

    if branch.iter().any(|name| name == object.name()) {
        return TreeNode::leaf(format!("{label} ↺"));
    }

    branch.push(object.name().to_string());
    let children = object
        .dependencies()
        .iter()
        .filter_map(|dep| {
            let found = lookup(registry, &dep.tag, dep.declared)?;
            Some(node(registry, &found, Some(dep.field), branch))
        })
        .collect();
    branch.pop();

    TreeNode { label, children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, Injectable};
    use crate::Graph;

    #[derive(Default)]
    struct Test {
        target: i64,
        timeout: i64,
    }

    impl Injectable for Test {
        fn fields() -> Vec<FieldDescriptor<Self>> {
            vec![
                FieldDescriptor::value("target", r#"inject:"target""#, |s: &Test| &s.target, |s: &mut Test| &mut s.target),
                FieldDescriptor::value("timeout", r#"inject:"timeout""#, |s: &Test| &s.timeout, |s: &mut Test| &mut s.timeout),
            ]
        }
    }

    #[derive(Default)]
    struct Dep {
        test: Option<Arc<Test>>,
        wait: i64,
        note: String,
    }

    impl Injectable for Dep {
        fn fields() -> Vec<FieldDescriptor<Self>> {
            vec![
                FieldDescriptor::reference("test", r#"inject:"test""#, |s: &Dep| &s.test, |s: &mut Dep| &mut s.test),
                FieldDescriptor::value("wait", r#"inject:"wait""#, |s: &Dep| &s.wait, |s: &mut Dep| &mut s.wait),
                FieldDescriptor::value("note", r#"inject:"note" nilable:"true""#, |s: &Dep| &s.note, |s: &mut Dep| &mut s.note),
            ]
        }
    }

    fn wired() -> Graph {
        let graph = Graph::new();
        graph.register_value("target", 123i64).unwrap();
        graph.register_value("timeout", 123i64).unwrap();
        graph.register_value("wait", 123i64).unwrap();
        let dep = graph.register_single::<Dep>("dep", None).unwrap();
        assert!(dep.note.is_empty());
        assert_eq!(dep.wait, 123);
        graph
    }

    #[test]
    fn describe_lists_keys_in_order() {
        let graph = wired();
        let keys: Vec<String> = graph.describe().into_iter().map(|e| e.key).collect();
        assert_eq!(keys[..4], ["target", "timeout", "wait", "test"]);
        assert_eq!(keys[4], "dep");
        assert!(keys[5].contains("Dep"));
    }

    #[test]
    fn sprint_is_json() {
        let graph = wired();
        let json: serde_json::Value = serde_json::from_str(&graph.sprint()).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), graph.len());
        assert_eq!(entries[0]["key"], "target");
        assert_eq!(entries[0]["object"]["type"], "i64");
        assert!(entries[0]["object"].get("value").is_none());
        assert!(entries[3]["object"]["value"].as_str().unwrap().starts_with("0x"));
    }

    #[test]
    fn tree_shows_resolved_dependencies() {
        let graph = wired();
        let tree = graph.print_tree();
        let expected = "\
dep (Arc<Dep>)
├── test: test (Arc<Test>)
│   ├── target: target (i64)
│   └── timeout: timeout (i64)
└── wait: wait (i64)
";
        assert!(tree.contains(expected), "{tree}");
        // Alias keys are not separate roots.
        assert_eq!(tree.matches("\ndep (").count() + usize::from(tree.starts_with("dep (")), 1);
    }
}
