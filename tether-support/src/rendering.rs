//! Text rendering utilities for graph diagnostics.
//!
//! Provides helpers to format resolution chains, object trees,
//! short type names and "did you mean?" hints for missing keys.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use tether_support::rendering::render_chain;
///
/// let chain = vec!["rec1", "rec2", "rec1"];
/// assert_eq!(render_chain(&chain), "rec1 → rec2 → rec1");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" → ")
}

/// A node of a rendered object tree.
///
/// Built by the graph's tree printer: one node per registered object,
/// one child per resolved dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Text shown for this node
    pub label: String,
    /// Resolved dependencies, in field declaration order
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Creates a leaf node.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }
}

/// Renders a forest of nodes with box-drawing connectors.
///
/// ```text
/// dep (Dep)
/// ├── test (Test)
/// │   └── target (i64)
/// └── wait (i64)
/// ```
///
/// ```
/// use tether_support::rendering::{render_tree, TreeNode};
///
/// let root = TreeNode {
///     label: "dep".into(),
///     children: vec![TreeNode::leaf("test"), TreeNode::leaf("wait")],
/// };
/// assert_eq!(render_tree(&[root]), "dep\n├── test\n└── wait\n");
/// ```
pub fn render_tree(roots: &[TreeNode]) -> String {
    let mut out = String::new();
    for root in roots {
        out.push_str(&root.label);
        out.push('\n');
        render_children(&root.children, "", &mut out);
    }
    out
}

fn render_children(children: &[TreeNode], prefix: &str, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&child.label);
        out.push('\n');

        let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_children(&child.children, &nested, out);
    }
}

/// Drops module paths from a fully qualified type name.
///
/// ```
/// use tether_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("my_app::store::Database"), "Database");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn my_app::mail::Sender>"),
///     "Arc<dyn Sender>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Picks registered keys that look like the one requested.
///
/// Keys containing (or contained in) the requested key rank first,
/// then keys sharing a prefix of at least three characters.
///
/// ```
/// use tether_support::rendering::suggest_similar;
///
/// let keys = ["database", "db_pool", "mailer"];
/// assert_eq!(suggest_similar("databse", &keys, 3), vec!["database"]);
/// ```
pub fn suggest_similar(requested: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    let requested = requested.to_lowercase();
    if requested.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter_map(|&key| {
            let candidate = key.to_lowercase();
            if candidate == requested {
                return None;
            }
            if candidate.contains(&requested) || requested.contains(&candidate) {
                return Some((key, 100));
            }

            let common = candidate
                .chars()
                .zip(requested.chars())
                .take_while(|(a, b)| a == b)
                .count();
            (common >= 3).then_some((key, common * 10))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(key, _)| key.to_string())
        .collect()
}
