//! # Traversal recording
//!
//! Runs BFS or DFS from a start node and records one immutable [`TraversalStep`] per
//! visited node. Both algorithms share one driver loop and differ only in their
//! [`Frontier`]: a FIFO queue for BFS, an explicit LIFO stack for DFS.
//!
//! Snapshots use persistent collections, so consecutive steps share structure and
//! cloning the visited set or the frontier is O(1).

use std::collections::HashSet;
use std::fmt;

use im::{OrdSet, Vector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};

/// Traversal algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bfs,
    Dfs,
}

impl Algorithm {
    /// Both algorithms, in the order they are animated.
    pub const ALL: [Self; 2] = [Self::Bfs, Self::Dfs];

    /// Record a traversal of `graph` from `start` with this algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `start` is not in the graph.
    pub fn record(self, graph: &Graph, start: NodeId) -> Result<Trace> {
        match self {
            Self::Bfs => record_bfs(graph, start),
            Self::Dfs => record_dfs(graph, start),
        }
    }

    /// Lowercase name, used in file names.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bfs => write!(f, "BFS"),
            Self::Dfs => write!(f, "DFS"),
        }
    }
}

/// Visual state of a node at one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Not reached (yet, or ever).
    Unvisited,
    /// Discovered and waiting in the queue or stack.
    Frontier,
    /// Already processed.
    Visited,
    /// Processed in this step.
    Current,
}

/// Snapshot of a traversal after one node has been processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalStep {
    index: usize,
    current: NodeId,
    visited: OrdSet<NodeId>,
    frontier: Vector<NodeId>,
}

impl TraversalStep {
    /// Zero-based position of this step in its trace.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Node processed in this step.
    #[must_use]
    pub const fn current(&self) -> NodeId {
        self.current
    }

    /// Every node processed so far, `current` included.
    #[must_use]
    pub const fn visited(&self) -> &OrdSet<NodeId> {
        &self.visited
    }

    /// Frontier after this step: queue order for BFS (front first),
    /// stack order for DFS (bottom first, next pop last).
    #[must_use]
    pub const fn frontier(&self) -> &Vector<NodeId> {
        &self.frontier
    }

    /// State of `node` at this step. Current wins over frontier, frontier over visited.
    #[must_use]
    pub fn state_of(&self, node: NodeId) -> NodeState {
        if node == self.current {
            NodeState::Current
        } else if self.frontier.contains(&node) {
            NodeState::Frontier
        } else if self.visited.contains(&node) {
            NodeState::Visited
        } else {
            NodeState::Unvisited
        }
    }
}

/// Ordered steps of one traversal run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    algorithm: Algorithm,
    start: NodeId,
    steps: Vec<TraversalStep>,
}

impl Trace {
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub const fn start(&self) -> NodeId {
        self.start
    }

    #[must_use]
    pub fn steps(&self) -> &[TraversalStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Nodes in the order they became current.
    #[must_use]
    pub fn order(&self) -> Vec<NodeId> {
        self.steps.iter().map(TraversalStep::current).collect()
    }

    /// Visited set after the final step.
    #[must_use]
    pub fn reached(&self) -> OrdSet<NodeId> {
        self.steps
            .last()
            .map(|step| step.visited.clone())
            .unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraversalStep;
    type IntoIter = std::slice::Iter<'a, TraversalStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Pending nodes of a traversal.
trait Frontier {
    /// Admit unvisited successors of the node just processed, given in ascending id order.
    fn admit(&mut self, successors: &[NodeId]);

    /// Take the next node to process.
    fn next(&mut self) -> Option<NodeId>;

    /// Current contents, in the order documented on [`TraversalStep::frontier`].
    fn snapshot(&self) -> Vector<NodeId>;
}

/// FIFO queue. A node is enqueued at most once.
#[derive(Debug, Default)]
struct Queue {
    pending: Vector<NodeId>,
    discovered: HashSet<NodeId>,
}

impl Frontier for Queue {
    fn admit(&mut self, successors: &[NodeId]) {
        for &node in successors {
            if self.discovered.insert(node) {
                self.pending.push_back(node);
            }
        }
    }

    fn next(&mut self) -> Option<NodeId> {
        self.pending.pop_front()
    }

    fn snapshot(&self) -> Vector<NodeId> {
        self.pending.clone()
    }
}

/// LIFO stack. Re-admitting a node moves it to the top instead of duplicating it.
#[derive(Debug, Default)]
struct Stack {
    pending: Vector<NodeId>,
}

impl Frontier for Stack {
    fn admit(&mut self, successors: &[NodeId]) {
        // Reverse so the smallest id ends on top and is popped first.
        for &node in successors.iter().rev() {
            if let Some(position) = self.pending.index_of(&node) {
                self.pending.remove(position);
            }
            self.pending.push_back(node);
        }
    }

    fn next(&mut self) -> Option<NodeId> {
        self.pending.pop_back()
    }

    fn snapshot(&self) -> Vector<NodeId> {
        self.pending.clone()
    }
}

/// Record a breadth-first traversal of `graph` from `start`.
///
/// # Errors
///
/// Returns [`Error::NodeNotFound`] if `start` is not in the graph.
///
/// # Examples
///
/// ```
/// use flowviz_core::{Graph, record_bfs};
///
/// let mut graph = Graph::new();
/// for id in 0..3 {
///     graph.add_node(id).unwrap();
/// }
/// graph.add_edge(0, 1, 1.0).unwrap();
/// graph.add_edge(1, 2, 1.0).unwrap();
///
/// let trace = record_bfs(&graph, 0).unwrap();
/// assert_eq!(trace.order(), vec![0, 1, 2]);
/// ```
pub fn record_bfs(graph: &Graph, start: NodeId) -> Result<Trace> {
    record_with(graph, start, Algorithm::Bfs, Queue::default())
}

/// Record a depth-first traversal of `graph` from `start`, using an explicit stack.
///
/// # Errors
///
/// Returns [`Error::NodeNotFound`] if `start` is not in the graph.
pub fn record_dfs(graph: &Graph, start: NodeId) -> Result<Trace> {
    record_with(graph, start, Algorithm::Dfs, Stack::default())
}

fn record_with<F: Frontier>(
    graph: &Graph,
    start: NodeId,
    algorithm: Algorithm,
    mut frontier: F,
) -> Result<Trace> {
    if !graph.contains_node(start) {
        return Err(Error::NodeNotFound(start));
    }

    let mut visited: OrdSet<NodeId> = OrdSet::new();
    let mut steps = Vec::new();

    frontier.admit(&[start]);

    while let Some(current) = frontier.next() {
        visited.insert(current);

        let unvisited: Vec<NodeId> = graph
            .successors(current)?
            .into_iter()
            .filter(|node| !visited.contains(node))
            .collect();
        frontier.admit(&unvisited);

        let step = TraversalStep {
            index: steps.len(),
            current,
            visited: visited.clone(),
            frontier: frontier.snapshot(),
        };
        debug!(
            %algorithm,
            step = step.index,
            current,
            frontier = step.frontier.len(),
            "Recorded traversal step"
        );
        steps.push(step);
    }

    info!(
        %algorithm,
        start,
        steps = steps.len(),
        unreached = graph.node_count().saturating_sub(visited.len()),
        "Recorded traversal"
    );

    Ok(Trace {
        algorithm,
        start,
        steps,
    })
}
