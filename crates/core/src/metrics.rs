//! Search metrics collected while computing a max flow.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::graph::NodeId;

/// Snapshot of search performance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMetrics {
    /// Nodes expanded across every path search.
    pub steps: usize,
    /// Augmenting paths found.
    pub paths_found: usize,
    /// Flow pushed so far.
    pub total_flow: f64,
    /// Nodes in the order they were first expanded.
    pub visited_nodes: Vec<NodeId>,
    /// Wall time since tracking started.
    pub elapsed: Duration,
}

/// Accumulates [`SearchMetrics`] during a run.
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    started: Instant,
    steps: usize,
    paths_found: usize,
    total_flow: f64,
    visited_nodes: Vec<NodeId>,
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::start()
    }
}

impl MetricsTracker {
    /// Start tracking now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            steps: 0,
            paths_found: 0,
            total_flow: 0.0,
            visited_nodes: Vec::new(),
        }
    }

    /// Count one node expansion.
    pub fn expand(&mut self, node: NodeId) {
        self.steps = self.steps.saturating_add(1);
        if !self.visited_nodes.contains(&node) {
            self.visited_nodes.push(node);
        }
    }

    /// Count one augmenting path carrying `flow`.
    pub fn add_path(&mut self, flow: f64) {
        self.paths_found = self.paths_found.saturating_add(1);
        self.total_flow += flow;
    }

    /// Current metrics.
    #[must_use]
    pub fn snapshot(&self) -> SearchMetrics {
        SearchMetrics {
            steps: self.steps,
            paths_found: self.paths_found,
            total_flow: self.total_flow,
            visited_nodes: self.visited_nodes.clone(),
            elapsed: self.started.elapsed(),
        }
    }
}
