//! CLI command handlers.
//!
//! Each handler takes the fully resolved configuration, runs one pipeline, and
//! prints a short summary of what it wrote.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use flowviz_core::{NodeId, NodeKind};
use tracing::info;

use crate::cli::{AlgorithmArg, Cli, Commands, Overrides};
use crate::compare::{CompareConfig, render_table, run_comparison};
use crate::config::VisualizerConfig;
use crate::pipeline;

/// Resolve configuration and run the requested command. No subcommand means
/// `traverse` with its defaults.
pub fn execute(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli.overrides, cli.command.as_ref())?;

    match cli.command {
        None => cmd_traverse(config, None, &[]),
        Some(Commands::Traverse { start, algorithm }) => cmd_traverse(config, start, &algorithm),
        Some(Commands::Flow { search }) => cmd_flow(config, &search),
        Some(Commands::Compare {
            sizes,
            edge_budget,
            trials,
            json,
        }) => cmd_compare(&config, sizes, edge_budget, trials, json),
    }
}

/// Config file (or defaults), then command-line overrides, then validation.
/// `compare` generates its own graphs, so the `graph` section is not checked for it.
pub fn resolve_config(overrides: &Overrides, command: Option<&Commands>) -> Result<VisualizerConfig> {
    let mut config = match &overrides.config {
        Some(path) => VisualizerConfig::read(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => VisualizerConfig::default(),
    };

    overrides.apply(&mut config);
    let validated = match command {
        Some(Commands::Compare { .. }) => config.validate_without_graph(),
        _ => config.validate(),
    };
    validated.context("Invalid configuration after command-line overrides")?;
    Ok(config)
}

fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

fn cmd_traverse(
    mut config: VisualizerConfig,
    start: Option<NodeId>,
    algorithms: &[AlgorithmArg],
) -> Result<()> {
    if let Some(start) = start {
        config.traversal.start = start;
    }
    if !algorithms.is_empty() {
        config.traversal.algorithms = algorithms.iter().map(|&arg| arg.into()).collect();
    }

    ensure_output_dir(&config.export.output_dir)?;

    let graph = pipeline::build_graph(&config, false).context("Failed to build graph")?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        start = config.traversal.start,
        "Graph ready"
    );

    let outputs = pipeline::run_traversals(&config, &graph).context("Traversal failed")?;
    for output in outputs {
        println!(
            "{} animation saved to {} ({} frames, {} nodes reached)",
            output.algorithm,
            output.path.display(),
            output.frames,
            output.reached
        );
    }
    Ok(())
}

fn cmd_flow(mut config: VisualizerConfig, searches: &[AlgorithmArg]) -> Result<()> {
    if !searches.is_empty() {
        config.flow.searches = searches.iter().map(|&arg| arg.into()).collect();
    }

    ensure_output_dir(&config.export.output_dir)?;

    let graph = pipeline::build_graph(&config, true).context("Failed to build flow network")?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        sources = ?graph.nodes_of_kind(NodeKind::Source),
        sinks = ?graph.nodes_of_kind(NodeKind::Sink),
        "Flow network ready"
    );

    let outputs = pipeline::run_flows(&config, &graph).context("Max-flow run failed")?;
    for output in outputs {
        println!(
            "{} maximum flow: {:.1} over {} augmenting paths",
            output.search, output.max_flow, output.augmentations
        );
        if let Some(animation) = &output.animation {
            println!("  animation saved to {}", animation.display());
        }
        println!("  final state saved to {}", output.still.display());
    }
    Ok(())
}

fn cmd_compare(
    config: &VisualizerConfig,
    sizes: Vec<usize>,
    edge_budget: usize,
    trials: usize,
    json: bool,
) -> Result<()> {
    let compare = CompareConfig {
        sizes,
        edge_budget,
        trials,
        seed: config.graph.seed.unwrap_or_default(),
    };
    info!(sizes = ?compare.sizes, trials, "Comparing BFS and DFS path searches");

    let rows = run_comparison(&compare).context("Comparison failed")?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&rows).context("Failed to serialize comparison")?;
        println!("{rendered}");
    } else {
        print!("{}", render_table(&rows));
    }
    Ok(())
}
