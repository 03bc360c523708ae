//! Adjacency graph derived from declared edges.
//!
//! A graph is a pure function of an edge list: rebuilding it from the
//! same edges always yields the same adjacency, so the machine simply
//! recomputes it whenever a new edge is declared.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A declared connection between two states, optionally through a transition.
///
/// # Example
///
/// ```rust
/// use waypoint::core::Edge;
///
/// let edge = Edge::new("idle", "load", Some("loading"));
/// assert_eq!(edge.source, "idle");
/// assert_eq!(edge.transition.as_deref(), Some("loading"));
///
/// let instant = Edge::new("aim", "fire", None);
/// assert!(instant.transition.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// State the edge leaves from
    pub source: String,
    /// State the edge arrives at
    pub target: String,
    /// Transition run while moving along the edge, if any
    pub transition: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, transition: Option<&str>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            transition: transition.map(str::to_string),
        }
    }
}

/// Outgoing edge as stored in the adjacency list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjacent {
    pub target: String,
    pub transition: Option<String>,
}

/// Mapping from state name to its outgoing edges, in declaration order.
///
/// Every state that appears as a source or a target has an entry, so
/// routing never meets a missing key. Parallel edges between the same
/// pair of states are all kept.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{Edge, Graph};
///
/// let graph = Graph::from_edges(&[
///     Edge::new("idle", "load", Some("loading")),
///     Edge::new("load", "aim", None),
/// ]);
///
/// assert_eq!(graph.neighbors("idle").len(), 1);
/// assert!(graph.neighbors("aim").is_empty());
/// assert!(graph.contains("aim"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    adjacency: BTreeMap<String, Vec<Adjacent>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the adjacency for an edge list.
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph
                .adjacency
                .entry(edge.source.clone())
                .or_default()
                .push(Adjacent {
                    target: edge.target.clone(),
                    transition: edge.transition.clone(),
                });
            graph.add_node(&edge.target);
        }
        graph
    }

    /// Ensure `state` has an entry, leaving existing edges alone.
    pub fn add_node(&mut self, state: &str) {
        if !self.adjacency.contains_key(state) {
            self.adjacency.insert(state.to_string(), Vec::new());
        }
    }

    /// Same as [`Graph::add_node`], by value.
    pub fn with_node(mut self, state: &str) -> Self {
        self.add_node(state);
        self
    }

    pub fn contains(&self, state: &str) -> bool {
        self.adjacency.contains_key(state)
    }

    /// Outgoing edges of `state`; empty for unknown states.
    pub fn neighbors(&self, state: &str) -> &[Adjacent] {
        self.adjacency.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All state names, sorted.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}
