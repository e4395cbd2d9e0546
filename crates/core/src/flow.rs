//! # Maximum flow
//!
//! Ford–Fulkerson over the residual network of a [`Graph`], with edge weights read as
//! capacities. The augmenting-path search is pluggable: breadth-first search gives
//! Edmonds–Karp, depth-first search gives the classical variant.
//!
//! Flow is stored per original edge. The residual capacity of `(u, v)` is
//! `cap(u, v) - flow(u, v) + flow(v, u)`, which stays correct when the graph holds
//! both `u -> v` and `v -> u`.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId, NodeKind};
use crate::metrics::{MetricsTracker, SearchMetrics};

/// Residual capacities at or below this are treated as saturated.
pub const EPSILON: f64 = 1e-9;

/// Strategy for finding augmenting paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSearch {
    #[default]
    Bfs,
    Dfs,
}

impl PathSearch {
    pub const ALL: [Self; 2] = [Self::Bfs, Self::Dfs];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
        }
    }
}

impl fmt::Display for PathSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bfs => write!(f, "BFS"),
            Self::Dfs => write!(f, "DFS"),
        }
    }
}

/// Flow on one original edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeFlow {
    pub from: NodeId,
    pub to: NodeId,
    pub flow: f64,
    pub capacity: f64,
}

/// One pushed augmenting path and the network state right after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Augmentation {
    /// Zero-based position among the run's augmentations.
    pub index: usize,
    /// Source-to-sink node sequence.
    pub path: Vec<NodeId>,
    /// Flow pushed along `path`.
    pub bottleneck: f64,
    /// Flow value after this push.
    pub total_flow: f64,
    /// Flow on every original edge after this push.
    pub flows: Vec<EdgeFlow>,
}

impl Augmentation {
    /// Whether `from -> to` is a hop of this augmentation's path.
    #[must_use]
    pub fn uses_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.path
            .iter()
            .tuple_windows()
            .any(|(&a, &b)| a == from && b == to)
    }
}

/// Result of a max-flow computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRun {
    pub search: PathSearch,
    pub source: NodeId,
    pub sink: NodeId,
    pub max_flow: f64,
    pub augmentations: Vec<Augmentation>,
    pub final_flows: Vec<EdgeFlow>,
    pub metrics: SearchMetrics,
}

/// Flow state over a borrowed graph.
#[derive(Debug, Clone)]
pub struct FlowNetwork<'g> {
    graph: &'g Graph,
    flow: HashMap<(NodeId, NodeId), f64>,
    /// Residual neighbours of each node: successors and predecessors, ascending.
    residual_adjacency: BTreeMap<NodeId, Vec<NodeId>>,
}

impl<'g> FlowNetwork<'g> {
    /// Zero flow over `graph`.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::NodeNotFound`] from adjacency lookups; cannot occur for
    /// ids obtained from the graph itself.
    pub fn new(graph: &'g Graph) -> Result<Self> {
        let mut residual_adjacency = BTreeMap::new();
        for id in graph.node_ids() {
            let mut neighbours = graph.successors(id)?;
            neighbours.extend(graph.predecessors(id)?);
            neighbours.sort_unstable();
            neighbours.dedup();
            residual_adjacency.insert(id, neighbours);
        }

        Ok(Self {
            graph,
            flow: HashMap::new(),
            residual_adjacency,
        })
    }

    /// Flow currently on the original edge `from -> to` (0 when absent).
    #[must_use]
    pub fn flow(&self, from: NodeId, to: NodeId) -> f64 {
        self.flow.get(&(from, to)).copied().unwrap_or(0.0)
    }

    /// Residual capacity of `from -> to`.
    #[must_use]
    pub fn residual(&self, from: NodeId, to: NodeId) -> f64 {
        let capacity = self.graph.weight(from, to).unwrap_or(0.0);
        capacity - self.flow(from, to) + self.flow(to, from)
    }

    /// Net flow leaving `node`.
    #[must_use]
    pub fn net_outflow(&self, node: NodeId) -> f64 {
        self.graph
            .edges()
            .map(|edge| {
                let flow = self.flow(edge.from, edge.to);
                if edge.from == node {
                    flow
                } else if edge.to == node {
                    -flow
                } else {
                    0.0
                }
            })
            .sum()
    }

    /// Flow on every original edge, in the graph's edge order.
    #[must_use]
    pub fn edge_flows(&self) -> Vec<EdgeFlow> {
        self.graph
            .edges()
            .map(|edge| EdgeFlow {
                from: edge.from,
                to: edge.to,
                flow: self.flow(edge.from, edge.to),
                capacity: edge.weight,
            })
            .collect()
    }

    fn neighbours(&self, node: NodeId) -> &[NodeId] {
        self.residual_adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn has_capacity(&self, from: NodeId, to: NodeId) -> bool {
        self.residual(from, to) > EPSILON
    }

    /// Smallest residual capacity along `path`.
    #[must_use]
    pub fn bottleneck(&self, path: &[NodeId]) -> f64 {
        path.iter()
            .tuple_windows()
            .map(|(&from, &to)| self.residual(from, to))
            .fold(f64::INFINITY, f64::min)
    }

    /// Push `amount` along `from -> to`, cancelling reverse flow first.
    fn push(&mut self, from: NodeId, to: NodeId, amount: f64) {
        let reverse = self.flow(to, from);
        let cancelled = reverse.min(amount);
        if cancelled > 0.0 {
            self.flow.insert((to, from), reverse - cancelled);
        }

        let forward = amount - cancelled;
        if forward > 0.0 && self.graph.has_edge(from, to) {
            *self.flow.entry((from, to)).or_insert(0.0) += forward;
        }
    }

    /// Push `amount` along every hop of `path`.
    pub fn augment(&mut self, path: &[NodeId], amount: f64) {
        for (&from, &to) in path.iter().tuple_windows() {
            self.push(from, to, amount);
        }
    }

    /// Find an augmenting path from `source` to `sink`, counting expansions in `metrics`.
    pub fn find_augmenting_path(
        &self,
        source: NodeId,
        sink: NodeId,
        search: PathSearch,
        metrics: &mut MetricsTracker,
    ) -> Option<Vec<NodeId>> {
        match search {
            PathSearch::Bfs => self.breadth_first_path(source, sink, metrics),
            PathSearch::Dfs => self.depth_first_path(source, sink, metrics),
        }
    }

    fn breadth_first_path(
        &self,
        source: NodeId,
        sink: NodeId,
        metrics: &mut MetricsTracker,
    ) -> Option<Vec<NodeId>> {
        let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
        let mut seen: HashSet<NodeId> = HashSet::from([source]);
        let mut queue = VecDeque::from([source]);

        while let Some(current) = queue.pop_front() {
            metrics.expand(current);
            if current == sink {
                return Some(trace_back(&parents, source, sink));
            }

            for &next in self.neighbours(current) {
                if !seen.contains(&next) && self.has_capacity(current, next) {
                    seen.insert(next);
                    parents.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        None
    }

    fn depth_first_path(
        &self,
        source: NodeId,
        sink: NodeId,
        metrics: &mut MetricsTracker,
    ) -> Option<Vec<NodeId>> {
        let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
        let mut expanded: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(source, None)];

        while let Some((current, parent)) = stack.pop() {
            if !expanded.insert(current) {
                continue;
            }
            if let Some(parent) = parent {
                parents.insert(current, parent);
            }

            metrics.expand(current);
            if current == sink {
                return Some(trace_back(&parents, source, sink));
            }

            for &next in self.neighbours(current).iter().rev() {
                if !expanded.contains(&next) && self.has_capacity(current, next) {
                    stack.push((next, Some(current)));
                }
            }
        }

        None
    }
}

fn trace_back(parents: &HashMap<NodeId, NodeId>, source: NodeId, sink: NodeId) -> Vec<NodeId> {
    let mut path = vec![sink];
    let mut node = sink;
    while node != source {
        match parents.get(&node) {
            Some(&parent) => {
                path.push(parent);
                node = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Compute the maximum flow from `source` to `sink`, recording every augmentation.
///
/// # Errors
///
/// * [`Error::NodeNotFound`] if `source` or `sink` is missing
/// * [`Error::SourceIsSink`] if they are the same node
///
/// # Examples
///
/// ```
/// use flowviz_core::{Graph, PathSearch, max_flow};
///
/// let mut graph = Graph::new();
/// for id in 0..3 {
///     graph.add_node(id).unwrap();
/// }
/// graph.add_edge(0, 1, 4.0).unwrap();
/// graph.add_edge(1, 2, 3.0).unwrap();
///
/// let run = max_flow(&graph, 0, 2, PathSearch::Bfs).unwrap();
/// assert!((run.max_flow - 3.0).abs() < 1e-9);
/// ```
pub fn max_flow(graph: &Graph, source: NodeId, sink: NodeId, search: PathSearch) -> Result<FlowRun> {
    if !graph.contains_node(source) {
        return Err(Error::NodeNotFound(source));
    }
    if !graph.contains_node(sink) {
        return Err(Error::NodeNotFound(sink));
    }
    if source == sink {
        return Err(Error::SourceIsSink(source));
    }

    let mut network = FlowNetwork::new(graph)?;
    let mut metrics = MetricsTracker::start();
    let mut augmentations = Vec::new();
    let mut total_flow = 0.0;

    while let Some(path) = network.find_augmenting_path(source, sink, search, &mut metrics) {
        let bottleneck = network.bottleneck(&path);
        network.augment(&path, bottleneck);
        total_flow += bottleneck;
        metrics.add_path(bottleneck);

        debug!(
            %search,
            index = augmentations.len(),
            ?path,
            bottleneck,
            total_flow,
            "Pushed augmenting path"
        );

        augmentations.push(Augmentation {
            index: augmentations.len(),
            path,
            bottleneck,
            total_flow,
            flows: network.edge_flows(),
        });
    }

    let metrics = metrics.snapshot();
    info!(
        %search,
        source,
        sink,
        max_flow = total_flow,
        paths = augmentations.len(),
        steps = metrics.steps,
        "Computed maximum flow"
    );

    Ok(FlowRun {
        search,
        source,
        sink,
        max_flow: total_flow,
        final_flows: network.edge_flows(),
        augmentations,
        metrics,
    })
}

/// Compute the maximum flow between the graph's first source and first sink node.
///
/// # Errors
///
/// Returns [`Error::MissingTerminal`] if the graph has no source or no sink node,
/// otherwise as [`max_flow`].
pub fn max_flow_between_terminals(graph: &Graph, search: PathSearch) -> Result<FlowRun> {
    let (source, sink) = terminals(graph)?;
    max_flow(graph, source, sink, search)
}

/// First source and first sink of `graph`.
///
/// # Errors
///
/// Returns [`Error::MissingTerminal`] if either kind is absent.
pub fn terminals(graph: &Graph) -> Result<(NodeId, NodeId)> {
    let source = graph
        .nodes_of_kind(NodeKind::Source)
        .first()
        .copied()
        .ok_or(Error::MissingTerminal(NodeKind::Source))?;
    let sink = graph
        .nodes_of_kind(NodeKind::Sink)
        .first()
        .copied()
        .ok_or(Error::MissingTerminal(NodeKind::Sink))?;
    Ok((source, sink))
}
