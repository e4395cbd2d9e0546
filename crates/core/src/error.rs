//! Core error types for graph construction, traversal and flow computation.
//!
//! Every failure is explicit and typed; nothing in this crate panics on bad input.

use thiserror::Error;

use crate::graph::{NodeId, NodeKind};

/// Core error type for flowviz operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // Configuration errors
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("cannot generate {requested} edges over {nodes} nodes (maximum is {max})")]
    TooManyEdges {
        requested: usize,
        nodes: usize,
        max: usize,
    },

    // Input errors
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("node already exists: {0}")]
    NodeAlreadyExists(NodeId),

    #[error("edge already exists: {0} -> {1}")]
    EdgeAlreadyExists(NodeId, NodeId),

    #[error("self-loop rejected on node {0}")]
    SelfLoop(NodeId),

    #[error("edge {from} -> {to} has invalid weight {weight}: must be positive and finite")]
    InvalidWeight { from: NodeId, to: NodeId, weight: f64 },

    #[error("source and sink must differ (both are {0})")]
    SourceIsSink(NodeId),

    #[error("graph has no {0} node")]
    MissingTerminal(NodeKind),
}

impl Error {
    /// Create a configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// True for errors caused by bad configuration rather than bad input.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::TooManyEdges { .. })
    }
}

/// The standard Result type for flowviz core operations.
pub type Result<T> = std::result::Result<T, Error>;
