//! The unresolved dependency graph produced by the graph builder.
//!
//! Every occurrence of a dependency is its own node, so the graph is a tree:
//! a diamond `A -> C`, `B -> C` yields two `C` nodes. Nodes live in a
//! petgraph arena; the parent link is the single incoming edge.

use std::fmt;

use arbor_core::coordinate::{ConflictKey, Coordinate};
use arbor_core::dependency::{Dependency, Scope};
use arbor_core::provider::RemoteRepository;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// One occurrence of a dependency in the unresolved graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// The dependency after management, type resolution and range selection.
    /// `dependency.coordinate.version` is always a concrete version.
    pub dependency: Dependency,
    /// Declared scope after management and type defaults.
    pub scope: Scope,
    /// Distance from the root; the root itself has depth 0.
    pub depth: usize,
    pub premanaged_version: Option<String>,
    pub premanaged_scope: Option<Scope>,
    pub premanaged_optional: Option<bool>,
    /// The range the version was selected from, if it was declared as one.
    pub version_constraint: Option<String>,
    /// Repositories the node's metadata came from.
    pub repositories: Vec<RemoteRepository>,
}

impl GraphNode {
    pub fn coordinate(&self) -> &Coordinate {
        &self.dependency.coordinate
    }

    pub fn key(&self) -> ConflictKey {
        self.dependency.coordinate.key()
    }

    pub fn optional(&self) -> bool {
        self.dependency.optional
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dependency.coordinate)
    }
}

/// Edge label: the child's position in its parent's declaration list.
#[derive(Debug, Clone, Copy)]
pub struct DepEdge {
    pub position: usize,
}

/// Tree of dependency occurrences, rooted at the collected package.
#[derive(Debug, Clone)]
pub struct UnresolvedGraph {
    graph: DiGraph<GraphNode, DepEdge>,
    root: NodeIndex,
}

impl UnresolvedGraph {
    pub fn new(root: GraphNode) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(root);
        Self { graph, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Attach a new occurrence below `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, node: GraphNode, position: usize) -> NodeIndex {
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, DepEdge { position });
        idx
    }

    pub fn node(&self, idx: NodeIndex) -> &GraphNode {
        &self.graph[idx]
    }

    /// Children in declaration order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.weight().position, e.target()))
            .collect();
        edges.sort_unstable_by_key(|(position, _)| *position);
        edges.into_iter().map(|(_, child)| child).collect()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .next()
            .map(|e| e.source())
    }

    /// Path from the root down to `idx`, both included.
    pub fn path_to(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![idx];
        let mut current = idx;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// All nodes in depth-first pre-order, root first.
    pub fn preorder(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.children(idx).into_iter().rev());
        }
        order
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(coord: &str, depth: usize) -> GraphNode {
        let coordinate = Coordinate::parse(coord).unwrap().with_extension("jar");
        GraphNode {
            dependency: Dependency::new(coordinate).with_scope(Scope::Compile),
            scope: Scope::Compile,
            depth,
            premanaged_version: None,
            premanaged_scope: None,
            premanaged_optional: None,
            version_constraint: None,
            repositories: Vec::new(),
        }
    }

    #[test]
    fn children_keep_declaration_order() {
        let mut g = UnresolvedGraph::new(make_node("com.example:app:1.0", 0));
        let root = g.root();
        // inserted out of order on purpose
        let b = g.add_child(root, make_node("org.b:b:1.0", 1), 1);
        let a = g.add_child(root, make_node("org.a:a:1.0", 1), 0);
        let c = g.add_child(root, make_node("org.c:c:1.0", 1), 2);
        assert_eq!(g.children(root), vec![a, b, c]);
    }

    #[test]
    fn parent_and_path() {
        let mut g = UnresolvedGraph::new(make_node("com.example:app:1.0", 0));
        let root = g.root();
        let a = g.add_child(root, make_node("org.a:a:1.0", 1), 0);
        let b = g.add_child(a, make_node("org.b:b:1.0", 2), 0);
        assert_eq!(g.parent(root), None);
        assert_eq!(g.parent(b), Some(a));
        assert_eq!(g.path_to(b), vec![root, a, b]);
    }

    #[test]
    fn diamond_yields_two_occurrences() {
        let mut g = UnresolvedGraph::new(make_node("com.example:app:1.0", 0));
        let root = g.root();
        let a = g.add_child(root, make_node("org.a:a:1.0", 1), 0);
        let b = g.add_child(root, make_node("org.b:b:1.0", 1), 1);
        let c1 = g.add_child(a, make_node("org.c:c:1.0", 2), 0);
        let c2 = g.add_child(b, make_node("org.c:c:1.0", 2), 0);
        assert_ne!(c1, c2);
        assert_eq!(g.node(c1).key(), g.node(c2).key());
        assert_eq!(g.len(), 5);
    }

    #[test]
    fn preorder_walks_depth_first() {
        let mut g = UnresolvedGraph::new(make_node("com.example:app:1.0", 0));
        let root = g.root();
        let a = g.add_child(root, make_node("org.a:a:1.0", 1), 0);
        let b = g.add_child(root, make_node("org.b:b:1.0", 1), 1);
        let a1 = g.add_child(a, make_node("org.a:a1:1.0", 2), 0);
        assert_eq!(g.preorder(), vec![root, a, a1, b]);
    }
}
