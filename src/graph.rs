//! Undirected graph construction from an edge list.
//!
//! Adjacency is a symmetric neighbor mapping with set semantics: duplicate
//! edges collapse, self-loops are dropped (their endpoint is still
//! registered as a node). Node order is first-seen input order, which the
//! statistics sampling and the embedding tie-breaks rely on.

use crate::parser::Edge;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Node identifier, an opaque non-empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Undirected graph: distinct nodes in first-seen order plus a symmetric
/// adjacency. Invariants: `v ∈ adj[u] ⇔ u ∈ adj[v]` and `u ∉ adj[u]`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<NodeId>,
    adjacency: HashMap<NodeId, HashSet<NodeId>>,
}

impl Graph {
    /// Build the graph from an edge list. Both endpoints of every edge are
    /// registered as nodes; the edge itself is inserted in both directions
    /// unless it is a self-loop.
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut graph = Graph::default();
        for edge in edges {
            let source = NodeId::new(edge.source.as_str());
            let target = NodeId::new(edge.target.as_str());
            graph.register(&source);
            graph.register(&target);
            if source == target {
                continue;
            }
            graph
                .adjacency
                .get_mut(&source)
                .expect("registered above")
                .insert(target.clone());
            graph
                .adjacency
                .get_mut(&target)
                .expect("registered above")
                .insert(source);
        }
        graph
    }

    fn register(&mut self, id: &NodeId) {
        if !self.adjacency.contains_key(id) {
            self.nodes.push(id.clone());
            self.adjacency.insert(id.clone(), HashSet::new());
        }
    }

    /// Distinct node ids in first-seen order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges after deduplication.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|s| s.len()).sum::<usize>() / 2
    }

    pub fn neighbors(&self, id: &NodeId) -> Option<&HashSet<NodeId>> {
        self.adjacency.get(id)
    }

    pub fn degree(&self, id: &NodeId) -> usize {
        self.adjacency.get(id).map_or(0, |s| s.len())
    }

    pub fn has_edge(&self, a: &NodeId, b: &NodeId) -> bool {
        self.adjacency.get(a).is_some_and(|s| s.contains(b))
    }

    pub fn adjacency(&self) -> &HashMap<NodeId, HashSet<NodeId>> {
        &self.adjacency
    }
}
