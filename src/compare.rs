//! BFS vs DFS augmenting-path comparison over a sweep of graph sizes.

use std::fmt::Write as _;
use std::time::Duration;

use flowviz_core::{GeneratorConfig, Graph, PathSearch, generate, max_flow_between_terminals};
use serde::Serialize;
use tracing::{debug, info};

/// Capacity range of generated comparison networks.
const MIN_CAPACITY: f64 = 1.0;
const MAX_CAPACITY: f64 = 10.0;

/// Sweep parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareConfig {
    pub sizes: Vec<usize>,
    /// Requested edges per graph; capped at a fifth of the possible edges.
    pub edge_budget: usize,
    pub trials: usize,
    /// Base seed; trial `t` at size `n` derives its own seed from it.
    pub seed: u64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            sizes: vec![10, 20, 50, 100, 200],
            edge_budget: 50,
            trials: 3,
            seed: 0,
        }
    }
}

impl CompareConfig {
    /// # Errors
    ///
    /// Returns a configuration error for an empty sweep, zero trials, or a size
    /// too small to hold a distinct source and sink.
    pub fn validate(&self) -> flowviz_core::Result<()> {
        if self.sizes.is_empty() {
            return Err(flowviz_core::Error::invalid_config("sizes must not be empty"));
        }
        if self.trials == 0 {
            return Err(flowviz_core::Error::invalid_config("trials must be greater than 0"));
        }
        if let Some(size) = self.sizes.iter().find(|&&size| size < 2) {
            return Err(flowviz_core::Error::invalid_config(format!(
                "size {size} cannot hold a source and a sink"
            )));
        }
        Ok(())
    }

    /// Edge count actually used for `nodes`.
    #[must_use]
    pub fn edges_for(&self, nodes: usize) -> usize {
        self.edge_budget.min(Graph::max_edges(nodes) / 5)
    }

    fn seed_for(&self, nodes: usize, trial: usize) -> u64 {
        let offset = (nodes as u64).wrapping_mul(1_000).wrapping_add(trial as u64);
        self.seed.wrapping_add(offset)
    }
}

/// Mean cost of one path search at one size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    pub search: PathSearch,
    pub mean_steps: f64,
    pub mean_paths: f64,
    pub mean_flow: f64,
    pub mean_millis: f64,
}

/// One size of the sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub nodes: usize,
    pub edges: usize,
    pub trials: usize,
    pub searches: Vec<SearchSummary>,
}

impl ComparisonRow {
    #[must_use]
    pub fn summary(&self, search: PathSearch) -> Option<&SearchSummary> {
        self.searches.iter().find(|summary| summary.search == search)
    }
}

#[derive(Default)]
struct Totals {
    steps: usize,
    paths: usize,
    flow: f64,
    elapsed: Duration,
}

/// Run the sweep. Every trial graph is searched by both strategies.
///
/// # Errors
///
/// Returns a configuration error if `config` is invalid.
pub fn run_comparison(config: &CompareConfig) -> flowviz_core::Result<Vec<ComparisonRow>> {
    config.validate()?;

    config
        .sizes
        .iter()
        .map(|&nodes| compare_size(config, nodes))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn compare_size(config: &CompareConfig, nodes: usize) -> flowviz_core::Result<ComparisonRow> {
    let edges = config.edges_for(nodes);
    let mut totals: Vec<Totals> = PathSearch::ALL.iter().map(|_| Totals::default()).collect();

    for trial in 0..config.trials {
        let generator = GeneratorConfig::new(nodes, edges)
            .with_weights(MIN_CAPACITY, MAX_CAPACITY)
            .with_terminals(1, 1)
            .with_seed(config.seed_for(nodes, trial));
        let graph = generate(&generator)?;

        for (search, total) in PathSearch::ALL.iter().zip(totals.iter_mut()) {
            let run = max_flow_between_terminals(&graph, *search)?;
            debug!(nodes, trial, %search, max_flow = run.max_flow, "Trial finished");
            total.steps = total.steps.saturating_add(run.metrics.steps);
            total.paths = total.paths.saturating_add(run.metrics.paths_found);
            total.flow += run.max_flow;
            total.elapsed = total.elapsed.saturating_add(run.metrics.elapsed);
        }
    }

    let trials = config.trials as f64;
    let searches = PathSearch::ALL
        .iter()
        .zip(totals)
        .map(|(&search, total)| {
            SearchSummary {
                search,
                mean_steps: total.steps as f64 / trials,
                mean_paths: total.paths as f64 / trials,
                mean_flow: total.flow / trials,
                mean_millis: total.elapsed.as_secs_f64() * 1_000.0 / trials,
            }
        })
        .collect();

    info!(nodes, edges, trials = config.trials, "Compared path searches");

    Ok(ComparisonRow {
        nodes,
        edges,
        trials: config.trials,
        searches,
    })
}

/// Plain-text table, one line per size and search.
#[must_use]
pub fn render_table(rows: &[ComparisonRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6} {:>6} {:>6} {:>10} {:>8} {:>10} {:>10}",
        "nodes", "edges", "search", "steps", "paths", "flow", "ms"
    );
    for row in rows {
        for summary in &row.searches {
            let _ = writeln!(
                out,
                "{:>6} {:>6} {:>6} {:>10.1} {:>8.1} {:>10.2} {:>10.3}",
                row.nodes,
                row.edges,
                summary.search.slug(),
                summary.mean_steps,
                summary.mean_paths,
                summary.mean_flow,
                summary.mean_millis
            );
        }
    }
    out
}
