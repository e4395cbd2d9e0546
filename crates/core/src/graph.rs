//! # Weighted directed graph
//!
//! Simple directed graph over integer node ids, backed by petgraph's `DiGraph`.
//! At most one edge per ordered pair, no self-loops, every weight positive and finite.

use std::collections::HashMap;
use std::fmt;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Node identifier.
pub type NodeId = usize;

/// Role of a node in a flow network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Source,
    Sink,
    #[default]
    Intermediate,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Sink => write!(f, "sink"),
            Self::Intermediate => write!(f, "intermediate"),
        }
    }
}

/// Node payload stored in the petgraph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    id: NodeId,
    kind: NodeKind,
}

/// A directed weighted edge, as handed out by [`Graph::edges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
}

/// Directed weighted graph wrapping petgraph's `DiGraph`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// The underlying directed graph
    graph: DiGraph<Node, f64>,
    /// Map from NodeId to NodeIndex for O(1) lookups
    node_map: HashMap<NodeId, NodeIndex>,
}

impl Graph {
    /// Create a new empty graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowviz_core::Graph;
    ///
    /// let graph = Graph::new();
    /// assert_eq!(graph.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of edges a simple directed graph over `nodes` nodes can hold.
    #[must_use]
    pub const fn max_edges(nodes: usize) -> usize {
        nodes.saturating_mul(nodes.saturating_sub(1))
    }

    /// Add an intermediate node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeAlreadyExists`] if `id` is already present.
    pub fn add_node(&mut self, id: NodeId) -> Result<()> {
        self.add_node_with_kind(id, NodeKind::Intermediate)
    }

    /// Add a node with an explicit kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeAlreadyExists`] if `id` is already present.
    pub fn add_node_with_kind(&mut self, id: NodeId, kind: NodeKind) -> Result<()> {
        if self.node_map.contains_key(&id) {
            return Err(Error::NodeAlreadyExists(id));
        }

        let index = self.graph.add_node(Node { id, kind });
        self.node_map.insert(id, index);

        Ok(())
    }

    /// Change the kind of an existing node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `id` is not in the graph.
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) -> Result<()> {
        let index = self.index_of(id)?;
        if let Some(node) = self.graph.node_weight_mut(index) {
            node.kind = kind;
        }
        Ok(())
    }

    /// Add a directed edge with a weight.
    ///
    /// # Errors
    ///
    /// * [`Error::SelfLoop`] if `from == to`
    /// * [`Error::InvalidWeight`] if the weight is not positive and finite
    /// * [`Error::NodeNotFound`] if either endpoint is missing
    /// * [`Error::EdgeAlreadyExists`] if the ordered pair already has an edge
    ///
    /// # Examples
    ///
    /// ```
    /// use flowviz_core::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.add_node(0).unwrap();
    /// graph.add_node(1).unwrap();
    /// assert!(graph.add_edge(0, 1, 2.5).is_ok());
    /// assert!(graph.add_edge(0, 1, 1.0).is_err());
    /// ```
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<()> {
        if from == to {
            return Err(Error::SelfLoop(from));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::InvalidWeight { from, to, weight });
        }

        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;

        if self.graph.find_edge(from_index, to_index).is_some() {
            return Err(Error::EdgeAlreadyExists(from, to));
        }

        self.graph.add_edge(from_index, to_index, weight);

        Ok(())
    }

    /// Whether the graph contains `id`.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_map.contains_key(&id)
    }

    /// Whether the edge `from -> to` exists.
    #[must_use]
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.weight(from, to).is_some()
    }

    /// Weight of the edge `from -> to`, if present.
    #[must_use]
    pub fn weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let from_index = self.node_map.get(&from)?;
        let to_index = self.node_map.get(&to)?;
        let edge = self.graph.find_edge(*from_index, *to_index)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Kind of node `id`, if present.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        let index = self.node_map.get(&id)?;
        self.graph.node_weight(*index).map(|node| node.kind)
    }

    /// All node ids in ascending order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.node_map.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of every node of the given kind, ascending.
    #[must_use]
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .graph
            .node_weights()
            .filter(|node| node.kind == kind)
            .map(|node| node.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over every edge in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_references().filter_map(move |edge| {
            let from = self.graph.node_weight(edge.source())?.id;
            let to = self.graph.node_weight(edge.target())?.id;
            Some(Edge {
                from,
                to,
                weight: *edge.weight(),
            })
        })
    }

    /// Successors of `id` in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `id` is not in the graph.
    pub fn successors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let index = self.index_of(id)?;
        let mut ids: Vec<NodeId> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .filter_map(|next| self.graph.node_weight(next).map(|node| node.id))
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Predecessors of `id` in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `id` is not in the graph.
    pub fn predecessors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let index = self.index_of(id)?;
        let mut ids: Vec<NodeId> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .filter_map(|prev| self.graph.node_weight(prev).map(|node| node.id))
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn index_of(&self, id: NodeId) -> Result<NodeIndex> {
        self.node_map
            .get(&id)
            .copied()
            .ok_or(Error::NodeNotFound(id))
    }
}
