//! Random graph generation.
//!
//! Edges are sampled uniformly without repetition from every ordered pair `u != v`,
//! weights are drawn uniformly from `[min_weight, max_weight]`.

use rand::seq::SliceRandom;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId, NodeKind};

/// Parameters of a generated graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of nodes; ids are `0..node_count`.
    #[serde(default = "default_node_count")]
    pub node_count: usize,

    /// Number of directed edges.
    #[serde(default = "default_edge_count")]
    pub edge_count: usize,

    /// Lower bound of the weight range (inclusive).
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,

    /// Upper bound of the weight range (inclusive).
    #[serde(default = "default_max_weight")]
    pub max_weight: f64,

    /// Number of nodes marked as flow sources.
    #[serde(default)]
    pub source_count: usize,

    /// Number of nodes marked as flow sinks.
    #[serde(default)]
    pub sink_count: usize,

    /// Seed for reproducible graphs. Fresh entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            node_count: default_node_count(),
            edge_count: default_edge_count(),
            min_weight: default_min_weight(),
            max_weight: default_max_weight(),
            source_count: 0,
            sink_count: 0,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Config with the given counts and default weights.
    #[must_use]
    pub fn new(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            edge_count,
            ..Self::default()
        }
    }

    /// Set the inclusive weight range.
    #[must_use]
    pub const fn with_weights(mut self, min_weight: f64, max_weight: f64) -> Self {
        self.min_weight = min_weight;
        self.max_weight = max_weight;
        self
    }

    /// Set how many nodes are marked source and sink.
    #[must_use]
    pub const fn with_terminals(mut self, source_count: usize, sink_count: usize) -> Self {
        self.source_count = source_count;
        self.sink_count = sink_count;
        self
    }

    /// Fix the RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the counts or the weight range cannot be realized.
    pub fn validate(&self) -> Result<()> {
        if self.node_count == 0 {
            return Err(Error::invalid_config("node_count must be greater than 0"));
        }

        let max = Graph::max_edges(self.node_count);
        if self.edge_count > max {
            return Err(Error::TooManyEdges {
                requested: self.edge_count,
                nodes: self.node_count,
                max,
            });
        }

        if !self.min_weight.is_finite() || !self.max_weight.is_finite() {
            return Err(Error::invalid_config("weight bounds must be finite"));
        }

        if self.min_weight <= 0.0 {
            return Err(Error::invalid_config(format!(
                "min_weight must be positive, got {}",
                self.min_weight
            )));
        }

        if self.min_weight > self.max_weight {
            return Err(Error::invalid_config(format!(
                "min_weight {} exceeds max_weight {}",
                self.min_weight, self.max_weight
            )));
        }

        if self.source_count.saturating_add(self.sink_count) > self.node_count {
            return Err(Error::invalid_config(format!(
                "{} sources and {} sinks do not fit in {} nodes",
                self.source_count, self.sink_count, self.node_count
            )));
        }

        Ok(())
    }
}

fn default_node_count() -> usize {
    10
}

fn default_edge_count() -> usize {
    20
}

fn default_min_weight() -> f64 {
    1.0
}

fn default_max_weight() -> f64 {
    2.0
}

/// Generate a graph from `config`, seeding the RNG from `config.seed`.
///
/// # Errors
///
/// Returns a configuration error if `config` fails [`GeneratorConfig::validate`].
///
/// # Examples
///
/// ```
/// use flowviz_core::{GeneratorConfig, generate};
///
/// let graph = generate(&GeneratorConfig::new(5, 8).with_seed(7)).unwrap();
/// assert_eq!(graph.node_count(), 5);
/// assert_eq!(graph.edge_count(), 8);
/// ```
pub fn generate(config: &GeneratorConfig) -> Result<Graph> {
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    generate_with_rng(config, &mut rng)
}

/// Generate a graph from `config` using the caller's RNG.
///
/// # Errors
///
/// Returns a configuration error if `config` fails [`GeneratorConfig::validate`].
pub fn generate_with_rng<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> Result<Graph> {
    config.validate()?;

    let n = config.node_count;
    let mut graph = Graph::new();
    for id in 0..n {
        graph.add_node(id)?;
    }

    // Pair index k enumerates (u, v) with u != v: u = k / (n - 1), v skips u.
    let mut picks = index::sample(rng, Graph::max_edges(n), config.edge_count).into_vec();
    picks.sort_unstable();

    for k in picks {
        let (from, to) = pair_from_index(k, n);
        let weight = rng.gen_range(config.min_weight..=config.max_weight);
        graph.add_edge(from, to, weight)?;
    }

    assign_terminals(&mut graph, config, rng)?;

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        seed = ?config.seed,
        "Generated random graph"
    );

    Ok(graph)
}

const fn pair_from_index(k: usize, n: usize) -> (NodeId, NodeId) {
    let span = n - 1;
    let from = k / span;
    let offset = k % span;
    let to = if offset < from { offset } else { offset + 1 };
    (from, to)
}

fn assign_terminals<R: Rng>(
    graph: &mut Graph,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<()> {
    if config.source_count == 0 && config.sink_count == 0 {
        return Ok(());
    }

    let mut ids = graph.node_ids();
    ids.shuffle(rng);

    let (sources, rest) = ids.split_at(config.source_count);
    let sinks = rest.get(..config.sink_count).unwrap_or(rest);

    for &id in sources {
        graph.set_kind(id, NodeKind::Source)?;
    }
    for &id in sinks {
        graph.set_kind(id, NodeKind::Sink)?;
    }

    debug!(?sources, ?sinks, "Assigned terminal nodes");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.node_count, 10);
        assert_eq!(config.edge_count, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_nodes_is_config_error() {
        let err = GeneratorConfig::new(0, 0).validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_too_many_edges_is_config_error() {
        let err = GeneratorConfig::new(3, 7).validate().unwrap_err();
        assert_eq!(
            err,
            Error::TooManyEdges {
                requested: 7,
                nodes: 3,
                max: 6
            }
        );
    }

    #[test]
    fn test_bad_weight_ranges_rejected() {
        assert!(GeneratorConfig::new(3, 2).with_weights(0.0, 1.0).validate().is_err());
        assert!(GeneratorConfig::new(3, 2).with_weights(5.0, 1.0).validate().is_err());
        assert!(
            GeneratorConfig::new(3, 2)
                .with_weights(1.0, f64::INFINITY)
                .validate()
                .is_err()
        );
        assert!(GeneratorConfig::new(3, 2).with_weights(2.0, 2.0).validate().is_ok());
    }

    #[test]
    fn test_terminals_must_fit() {
        assert!(GeneratorConfig::new(2, 0).with_terminals(1, 1).validate().is_ok());
        assert!(GeneratorConfig::new(2, 0).with_terminals(2, 1).validate().is_err());
    }

    #[test]
    fn test_pair_index_covers_every_ordered_pair_once() {
        let n = 4;
        let mut pairs: Vec<_> = (0..Graph::max_edges(n))
            .map(|k| pair_from_index(k, n))
            .collect();
        assert!(pairs.iter().all(|(u, v)| u != v && *u < n && *v < n));
        pairs.sort_unstable();
        pairs.dedup();
        assert_eq!(pairs.len(), 12);
    }

    #[test]
    fn test_complete_graph_is_realizable() {
        let graph = generate(&GeneratorConfig::new(4, 12).with_seed(1)).unwrap();
        assert_eq!(graph.edge_count(), 12);
    }

    #[test]
    fn test_single_node_graph() {
        let graph = generate(&GeneratorConfig::new(1, 0).with_seed(1)).unwrap();
        assert_eq!(graph.node_ids(), vec![0]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_same_seed_same_graph() {
        let config = GeneratorConfig::new(8, 15).with_seed(42);
        let a: Vec<_> = generate(&config).unwrap().edges().collect();
        let b: Vec<_> = generate(&config).unwrap().edges().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_weights_within_range() {
        let config = GeneratorConfig::new(6, 20).with_weights(3.0, 4.0).with_seed(9);
        let graph = generate(&config).unwrap();
        assert!(graph.edges().all(|e| (3.0..=4.0).contains(&e.weight)));
    }

    #[test]
    fn test_terminals_assigned() {
        let config = GeneratorConfig::new(6, 10).with_terminals(1, 2).with_seed(3);
        let graph = generate(&config).unwrap();
        assert_eq!(graph.nodes_of_kind(NodeKind::Source).len(), 1);
        assert_eq!(graph.nodes_of_kind(NodeKind::Sink).len(), 2);
    }
}
