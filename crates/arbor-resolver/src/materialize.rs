//! The resolved dependency tree handed back to callers.

use std::collections::HashSet;
use std::fmt;

use arbor_core::coordinate::{ConflictKey, Coordinate};
use arbor_core::dependency::Scope;
use arbor_core::provider::RemoteRepository;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::conflict::ResolvedGraph;

/// One surviving dependency and its surviving children, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyNode {
    pub coordinate: Coordinate,
    pub scope: Scope,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premanaged_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premanaged_scope: Option<Scope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premanaged_optional: Option<bool>,
    /// The range the version was selected from, if one was declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_constraint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RemoteRepository>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DependencyNode>,
}

/// Copy the winners of a resolved graph into an owned tree.
///
/// Also returns the union of all repositories in the tree, first-seen
/// order, deduplicated by id.
pub fn materialize(resolved: &ResolvedGraph) -> (DependencyNode, Vec<RemoteRepository>) {
    let root = build_node(resolved, resolved.graph().root());
    let mut seen = HashSet::new();
    let repositories = root
        .iter()
        .flat_map(|node| node.repositories.iter())
        .filter(|repo| seen.insert(repo.id.clone()))
        .cloned()
        .collect();
    (root, repositories)
}

fn build_node(resolved: &ResolvedGraph, idx: NodeIndex) -> DependencyNode {
    let graph = resolved.graph();
    let node = graph.node(idx);
    let resolution = resolved.resolution(idx);
    let children = graph
        .children(idx)
        .into_iter()
        .filter(|&child| resolved.is_winner(child))
        .map(|child| build_node(resolved, child))
        .collect();

    DependencyNode {
        coordinate: node.coordinate().clone(),
        scope: resolution.map_or(node.scope, |r| r.scope),
        optional: resolution.map_or(node.optional(), |r| r.optional),
        premanaged_version: node.premanaged_version.clone(),
        premanaged_scope: node.premanaged_scope,
        premanaged_optional: node.premanaged_optional,
        version_constraint: node.version_constraint.clone(),
        repositories: node.repositories.clone(),
        children,
    }
}

impl DependencyNode {
    pub fn key(&self) -> ConflictKey {
        self.coordinate.key()
    }

    /// This node and all descendants, depth-first pre-order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.iter().count() - 1
    }

    /// First node matching `target`, see [`DependencyNode::matches`].
    pub fn find(&self, target: &str) -> Option<&DependencyNode> {
        self.iter().find(|node| node.matches(target))
    }

    /// Whether `target` names this node: its full conflict key,
    /// `group:artifact`, or the bare artifact name.
    pub fn matches(&self, target: &str) -> bool {
        let key = self.key();
        key.to_string() == target || key.ga() == target || key.artifact == target
    }

    /// Chain of nodes from this one down to the first node matching `target`.
    pub fn find_path(&self, target: &str) -> Option<Vec<&DependencyNode>> {
        let mut path = Vec::new();
        if self.dfs_path(target, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn dfs_path<'a>(&'a self, target: &str, path: &mut Vec<&'a DependencyNode>) -> bool {
        path.push(self);
        if self.matches(target) {
            return true;
        }
        for child in &self.children {
            if child.dfs_path(target, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Render the tree with box-drawing connectors, one node per line.
    pub fn render_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = format!("{}\n", self.coordinate);
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.render_subtree(&mut output, "", i == count - 1, 1, max_depth);
        }
        output
    }

    fn render_subtree(
        &self,
        output: &mut String,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{self}\n"));

        if max_depth.is_some_and(|max| depth >= max) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.render_subtree(output, &child_prefix, i == count - 1, depth + 1, max_depth);
        }
    }
}

impl fmt::Display for DependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}", self.coordinate, self.scope)?;
        if self.optional {
            write!(f, ", optional")?;
        }
        write!(f, "]")?;
        if let Some(version) = &self.premanaged_version {
            write!(f, " (version managed from {version})")?;
        }
        if let Some(scope) = &self.premanaged_scope {
            write!(f, " (scope managed from {scope})")?;
        }
        if let Some(range) = &self.version_constraint {
            write!(f, " (selected from {range})")?;
        }
        Ok(())
    }
}

/// Pre-order iterator over a [`DependencyNode`] tree.
pub struct Iter<'a> {
    stack: Vec<&'a DependencyNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a DependencyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(coord: &str, scope: Scope) -> DependencyNode {
        DependencyNode {
            coordinate: Coordinate::parse(coord).unwrap().with_extension("jar"),
            scope,
            optional: false,
            premanaged_version: None,
            premanaged_scope: None,
            premanaged_optional: None,
            version_constraint: None,
            repositories: Vec::new(),
            children: Vec::new(),
        }
    }

    fn sample() -> DependencyNode {
        let mut a = leaf("org.a:a:1.0", Scope::Compile);
        let mut c = leaf("org.c:c:2.0", Scope::Runtime);
        c.premanaged_version = Some("1.0".to_string());
        a.children.push(c);
        let mut b = leaf("org.b:b:1.0", Scope::Test);
        b.optional = true;
        let mut root = leaf("com.example:app:1.0", Scope::Compile);
        root.children = vec![a, b];
        root
    }

    #[test]
    fn render_full_tree() {
        let tree = sample().render_tree(None);
        let expected = "\
com.example:app:jar:1.0
├── org.a:a:jar:1.0 [compile]
│   └── org.c:c:jar:2.0 [runtime] (version managed from 1.0)
└── org.b:b:jar:1.0 [test, optional]
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn render_respects_max_depth() {
        let tree = sample().render_tree(Some(1));
        assert!(tree.contains("org.a:a"));
        assert!(!tree.contains("org.c:c"));
    }

    #[test]
    fn find_path_by_key_forms() {
        let root = sample();
        for target in ["org.c:c:jar", "org.c:c", "c"] {
            let path = root.find_path(target).unwrap();
            let names: Vec<&str> = path.iter().map(|n| n.coordinate.artifact.as_str()).collect();
            assert_eq!(names, vec!["app", "a", "c"]);
        }
        assert!(root.find_path("missing").is_none());
    }

    #[test]
    fn iteration_is_preorder() {
        let root = sample();
        let names: Vec<&str> = root.iter().map(|n| n.coordinate.artifact.as_str()).collect();
        assert_eq!(names, vec!["app", "a", "c", "b"]);
        assert_eq!(root.descendant_count(), 3);
        assert_eq!(root.find("b").unwrap().scope, Scope::Test);
    }
}
