//! # Visualization pipeline
//!
//! Generator → Recorder → Renderer → Exporter, strictly in that direction. The graph
//! is built once and borrowed by every run; one [`Renderer`] (and so one layout) is
//! shared by all animations of that graph. Output directories must already exist.

use std::path::PathBuf;

use flowviz_core::{
    Algorithm, Graph, PathSearch, example_flow_network, generate, max_flow_between_terminals,
};
use flowviz_render::{RenderError, Renderer, export_animation, export_still};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::VisualizerConfig;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Graph(#[from] flowviz_core::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// One written traversal animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalOutput {
    pub algorithm: Algorithm,
    pub path: PathBuf,
    pub frames: usize,
    /// Nodes reachable from the start, including it.
    pub reached: usize,
}

/// Files written for one max-flow run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowOutput {
    pub search: PathSearch,
    pub max_flow: f64,
    pub augmentations: usize,
    /// Absent when no augmenting path exists.
    pub animation: Option<PathBuf>,
    pub still: PathBuf,
}

/// Build the graph for a run: the built-in network when `config.example` is set,
/// otherwise a generated one. `with_terminals` guarantees at least one source and
/// one sink in a generated graph.
///
/// # Errors
///
/// Returns a configuration error if the generator config is invalid.
pub fn build_graph(config: &VisualizerConfig, with_terminals: bool) -> Result<Graph, PipelineError> {
    if config.example {
        return Ok(example_flow_network()?);
    }

    let mut generator = config.graph.clone();
    if with_terminals {
        generator.source_count = generator.source_count.max(1);
        generator.sink_count = generator.sink_count.max(1);
    }
    Ok(generate(&generator)?)
}

/// Record, render and export every configured traversal of `graph`.
///
/// # Errors
///
/// * [`flowviz_core::Error::NodeNotFound`] if the start node is not in the graph
/// * [`RenderError::Io`] if an animation cannot be written
pub fn run_traversals(
    config: &VisualizerConfig,
    graph: &Graph,
) -> Result<Vec<TraversalOutput>, PipelineError> {
    let renderer = Renderer::new(graph, config.render.clone())?;
    let start = config.traversal.start;

    config
        .traversal
        .algorithms
        .iter()
        .map(|&algorithm| {
            let trace = algorithm.record(graph, start)?;
            let path = config
                .export
                .path_for(&format!("{}_traversal", algorithm.slug()), "gif");

            let frames = export_animation(
                renderer.render_trace(&trace),
                &path,
                config.export.frame_duration(),
            )?;

            info!(
                %algorithm,
                start,
                order = ?trace.order(),
                path = %path.display(),
                "Wrote traversal animation"
            );

            Ok(TraversalOutput {
                algorithm,
                path,
                frames,
                reached: trace.reached().len(),
            })
        })
        .collect()
}

/// Compute, render and export max flow for every configured path search.
///
/// # Errors
///
/// * [`flowviz_core::Error::MissingTerminal`] if the graph lacks a source or sink
/// * [`RenderError::Io`] if an output file cannot be written
pub fn run_flows(config: &VisualizerConfig, graph: &Graph) -> Result<Vec<FlowOutput>, PipelineError> {
    let renderer = Renderer::new(graph, config.render.clone())?;

    config
        .flow
        .searches
        .iter()
        .map(|&search| {
            let run = max_flow_between_terminals(graph, search)?;
            let slug = search.slug();

            let animation = if run.augmentations.is_empty() {
                warn!(%search, source = run.source, sink = run.sink, "No augmenting path; skipping animation");
                None
            } else {
                let path = config.export.path_for(&format!("{slug}_flow"), "gif");
                export_animation(renderer.render_flow(&run), &path, config.export.frame_duration())?;
                Some(path)
            };

            let still = config.export.path_for(&format!("{slug}_final"), "png");
            export_still(&renderer.render_flow_final(&run), &still)?;

            info!(
                %search,
                max_flow = run.max_flow,
                paths = run.augmentations.len(),
                steps = run.metrics.steps,
                "Wrote max-flow visualization"
            );

            Ok(FlowOutput {
                search,
                max_flow: run.max_flow,
                augmentations: run.augmentations.len(),
                animation,
                still,
            })
        })
        .collect()
}
