//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use flowviz_core::{Algorithm, NodeId, PathSearch};

use crate::config::VisualizerConfig;

/// flowviz - graph traversal and max-flow animations
#[derive(Parser, Debug)]
#[command(name = "flowviz")]
#[command(version)]
#[command(about = "Animate BFS/DFS traversals and max-flow runs over generated graphs")]
#[command(
    long_about = "flowviz generates a weighted directed graph, records BFS and DFS from a start node, and writes one GIF per algorithm. Without a subcommand it runs `traverse` with the default configuration."
)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Settings shared by every subcommand; each one overrides the config file.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of nodes in the generated graph
    #[arg(short, long, global = true)]
    pub nodes: Option<usize>,

    /// Number of edges in the generated graph
    #[arg(short, long, global = true)]
    pub edges: Option<usize>,

    /// RNG seed for a reproducible graph
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Directory for the written animations
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Display time of each frame in milliseconds, a multiple of 10
    #[arg(long, global = true)]
    pub frame_ms: Option<u64>,

    /// Use the built-in seven-node network instead of a generated graph
    #[arg(long, global = true, default_value_t = false)]
    pub example: bool,
}

impl Overrides {
    /// Apply every given override on top of `config`.
    pub fn apply(&self, config: &mut VisualizerConfig) {
        if let Some(nodes) = self.nodes {
            config.graph.node_count = nodes;
        }
        if let Some(edges) = self.edges {
            config.graph.edge_count = edges;
        }
        if let Some(seed) = self.seed {
            config.graph.seed = Some(seed);
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_dir.clone_from(dir);
        }
        if let Some(frame_ms) = self.frame_ms {
            config.export.frame_ms = frame_ms;
        }
        if self.example {
            config.example = true;
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Record BFS and DFS and write one animation per algorithm
    Traverse {
        /// Start node
        #[arg(short, long)]
        start: Option<NodeId>,

        /// Restrict to these algorithms
        #[arg(short, long, value_enum)]
        algorithm: Vec<AlgorithmArg>,
    },

    /// Compute max flow and animate every augmenting path
    Flow {
        /// Restrict to these path searches
        #[arg(long, value_enum)]
        search: Vec<AlgorithmArg>,
    },

    /// Compare BFS and DFS max-flow cost over a sweep of graph sizes
    Compare {
        /// Node counts to test
        #[arg(long, value_delimiter = ',', default_values_t = [10, 20, 50, 100, 200])]
        sizes: Vec<usize>,

        /// Requested edge count, capped at a fifth of the possible edges
        #[arg(long, default_value_t = 50)]
        edge_budget: usize,

        /// Trials per size
        #[arg(long, default_value_t = 3)]
        trials: usize,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// BFS or DFS, as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmArg {
    Bfs,
    Dfs,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Bfs => Self::Bfs,
            AlgorithmArg::Dfs => Self::Dfs,
        }
    }
}

impl From<AlgorithmArg> for PathSearch {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Bfs => Self::Bfs,
            AlgorithmArg::Dfs => Self::Dfs,
        }
    }
}
