//! Directed graph of tasks
//!
//! Nodes are keyed by their identifier. Each node owns its outgoing edges;
//! an edge refers to its target by identifier, so replacing a node never
//! leaves dangling pointers behind.

use std::collections::hash_map::{Entry, Values};
use std::collections::HashMap;

/// Edge class for "must complete before" relationships
pub const DEPENDENCY_EDGE: &str = "dep";

/// Edge class for a task invoking another task from its commands
pub const CALL_EDGE: &str = "call";

/// A directed connection between two nodes, with an optional label and class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    from: String,
    to: String,
    label: String,
    class: String,
}

impl Edge {
    fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: String::new(),
            class: String::new(),
        }
    }

    /// Identifier of the source node
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Identifier of the target node
    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = label.into();
        self
    }

    /// Free-form category; the DOT writer styles [`DEPENDENCY_EDGE`] and
    /// [`CALL_EDGE`] edges, anything else is left unstyled.
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn set_class(&mut self, class: impl Into<String>) -> &mut Self {
        self.class = class.into();
        self
    }
}

/// A vertex in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: String,

    /// Display text; the id is shown when empty
    pub label: String,

    /// Free text rendered beneath the label
    pub description: String,

    /// Outgoing edges, in insertion order
    edges: Vec<Edge>,
}

impl Node {
    /// Creates a detached node with no edges
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            description: String::new(),
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the label, falling back to the id
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Appends an edge from this node to `to`.
    ///
    /// Self-loops and parallel edges are allowed. The caller is responsible
    /// for `to` naming a node of the same graph.
    pub fn add_edge(&mut self, to: impl Into<String>) -> &mut Edge {
        self.edges.push(Edge::new(self.id.clone(), to));
        let last = self.edges.len() - 1;
        &mut self.edges[last]
    }

    /// Outgoing edges in the order they were added
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// Iterator over the nodes of a [`Graph`], in no particular order.
///
/// Cloning the iterator restarts it from the same snapshot.
pub type Nodes<'a> = Values<'a, String, Node>;

/// A directed graph keyed by node identifier
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<String, Node>,
}

impl Graph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given id and returns it.
    ///
    /// An existing node with the same id is replaced; its outgoing edges
    /// are discarded along with it.
    pub fn add_node(&mut self, id: impl Into<String>) -> &mut Node {
        let id = id.into();
        let node = Node::new(id.clone());

        match self.nodes.entry(id) {
            Entry::Occupied(mut entry) => {
                entry.insert(node);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(node),
        }
    }

    /// Returns the node with the given id, if present
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns the node with the given id for modification, if present
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Returns true if the graph has a node with the given id
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Adds an edge between two existing nodes.
    ///
    /// Returns `None`, leaving the graph untouched, when either endpoint is
    /// missing.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Option<&mut Edge> {
        if !self.nodes.contains_key(to) {
            return None;
        }

        self.nodes.get_mut(from).map(|node| node.add_edge(to))
    }

    /// All nodes, unordered
    pub fn nodes(&self) -> Nodes<'_> {
        self.nodes.values()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of edges across all nodes
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.edges.len()).sum()
    }
}
