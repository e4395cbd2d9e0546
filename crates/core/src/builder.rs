//! Hand-built graphs and the built-in example networks.

use crate::error::{Error, Result};
use crate::generator::{GeneratorConfig, generate};
use crate::graph::{Graph, NodeId, NodeKind};

/// Fluent construction of a [`Graph`], validating each node and edge as it is added.
///
/// # Examples
///
/// ```
/// use flowviz_core::{GraphBuilder, NodeKind};
///
/// let graph = GraphBuilder::new()
///     .node(0, NodeKind::Source)?
///     .node(1, NodeKind::Sink)?
///     .edge(0, 1, 4.0)?
///     .build_flow_network()?;
/// assert_eq!(graph.edge_count(), 1);
/// # Ok::<(), flowviz_core::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeAlreadyExists`] on a duplicate id.
    pub fn node(mut self, id: NodeId, kind: NodeKind) -> Result<Self> {
        self.graph.add_node_with_kind(id, kind)?;
        Ok(self)
    }

    /// Add intermediate nodes for every id in `ids`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeAlreadyExists`] on a duplicate id.
    pub fn nodes(mut self, ids: impl IntoIterator<Item = NodeId>) -> Result<Self> {
        for id in ids {
            self.graph.add_node(id)?;
        }
        Ok(self)
    }

    /// Add a directed edge with a positive weight.
    ///
    /// # Errors
    ///
    /// See [`Graph::add_edge`].
    pub fn edge(mut self, from: NodeId, to: NodeId, weight: f64) -> Result<Self> {
        self.graph.add_edge(from, to, weight)?;
        Ok(self)
    }

    /// Finish without further checks.
    #[must_use]
    pub fn build(self) -> Graph {
        self.graph
    }

    /// Finish, requiring at least one source and one sink node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingTerminal`] if either kind is absent.
    pub fn build_flow_network(self) -> Result<Graph> {
        if self.graph.nodes_of_kind(NodeKind::Source).is_empty() {
            return Err(Error::MissingTerminal(NodeKind::Source));
        }
        if self.graph.nodes_of_kind(NodeKind::Sink).is_empty() {
            return Err(Error::MissingTerminal(NodeKind::Sink));
        }
        Ok(self.graph)
    }
}

/// Seven-node flow network with a known maximum flow of 15 from node 0 to node 6.
///
/// # Errors
///
/// Never fails in practice; construction goes through the validating builder.
pub fn example_flow_network() -> Result<Graph> {
    GraphBuilder::new()
        .node(0, NodeKind::Source)?
        .nodes(1..=5)?
        .node(6, NodeKind::Sink)?
        .edge(0, 1, 15.0)?
        .edge(0, 2, 12.0)?
        .edge(0, 3, 10.0)?
        .edge(1, 2, 8.0)?
        .edge(2, 3, 5.0)?
        .edge(3, 4, 6.0)?
        .edge(4, 5, 3.0)?
        .edge(5, 2, 7.0)?
        .edge(1, 4, 10.0)?
        .edge(4, 6, 12.0)?
        .edge(5, 6, 15.0)?
        .build_flow_network()
}

/// Small random flow network: 6 nodes, 8 edges, one source, one sink, capacities in `[1, 10]`.
///
/// # Errors
///
/// Never fails for these fixed parameters.
pub fn random_flow_network(seed: Option<u64>) -> Result<Graph> {
    let mut config = GeneratorConfig::new(6, 8)
        .with_weights(1.0, 10.0)
        .with_terminals(1, 1);
    config.seed = seed;
    generate(&config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_example_network_shape() {
        let graph = example_flow_network().expect("Example network should build");
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.edge_count(), 11);
        assert_eq!(graph.nodes_of_kind(NodeKind::Source), vec![0]);
        assert_eq!(graph.nodes_of_kind(NodeKind::Sink), vec![6]);
    }

    #[test]
    fn test_builder_requires_terminals() {
        let result = GraphBuilder::new()
            .node(0, NodeKind::Source)
            .and_then(|b| b.node(1, NodeKind::Intermediate))
            .and_then(GraphBuilder::build_flow_network);
        assert_eq!(result.err(), Some(Error::MissingTerminal(NodeKind::Sink)));
    }

    #[test]
    fn test_builder_propagates_edge_errors() {
        let result = GraphBuilder::new()
            .nodes([0, 1])
            .and_then(|b| b.edge(0, 1, -2.0));
        assert!(matches!(result, Err(Error::InvalidWeight { .. })));
    }

    #[test]
    fn test_random_network_has_terminals() {
        let graph = random_flow_network(Some(5)).unwrap();
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.edge_count(), 8);
        assert_eq!(graph.nodes_of_kind(NodeKind::Source).len(), 1);
        assert_eq!(graph.nodes_of_kind(NodeKind::Sink).len(), 1);
    }
}
