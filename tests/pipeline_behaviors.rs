//! End-to-end behavior of the visualization pipeline.
//!
//! These tests verify that:
//! - Each traversal writes one animation with one frame per recorded step
//! - Max-flow runs write an animation and a final still per path search
//! - Config files and command-line overrides combine as documented

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use flowviz::cli::{Commands, Overrides};
use flowviz::commands::resolve_config;
use flowviz::compare::{CompareConfig, run_comparison};
use flowviz::config::VisualizerConfig;
use flowviz::pipeline::{self, PipelineError};
use flowviz_core::{Algorithm, PathSearch};
use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn small_config(output_dir: &Path) -> VisualizerConfig {
    let mut config = VisualizerConfig::default();
    config.graph.node_count = 6;
    config.graph.edge_count = 9;
    config.graph.seed = Some(11);
    config.render.width = 320;
    config.render.height = 240;
    config.export.output_dir = output_dir.to_path_buf();
    config.export.frame_ms = 100;
    config
}

fn gif_frames(path: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    let decoder = GifDecoder::new(BufReader::new(File::open(path)?))?;
    Ok(decoder.into_frames().collect_frames()?.len())
}

/// # GIVEN
/// A small seeded graph and an empty output directory
///
/// # WHEN
/// Both traversals run through the pipeline
///
/// # THEN
/// `bfs_traversal.gif` and `dfs_traversal.gif` exist, each with one frame per step
#[test]
fn given_seeded_graph_when_traversals_run_then_one_gif_per_algorithm() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = small_config(dir.path());
    let graph = pipeline::build_graph(&config, false)?;

    let outputs = pipeline::run_traversals(&config, &graph)?;

    assert_eq!(outputs.len(), 2);
    for output in &outputs {
        let trace = output.algorithm.record(&graph, 0)?;
        let expected = dir.path().join(format!("{}_traversal.gif", output.algorithm.slug()));
        assert_eq!(output.path, expected);
        assert_eq!(output.frames, trace.len());
        assert_eq!(gif_frames(&expected)?, trace.len());
    }
    Ok(())
}

/// # GIVEN
/// A start node that is not in the graph
///
/// # WHEN
/// The traversal pipeline runs
///
/// # THEN
/// It fails with a node-not-found error and writes nothing
#[test]
fn given_missing_start_when_traversals_run_then_error_and_no_files() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut config = small_config(dir.path());
    config.traversal.start = 99;
    let graph = pipeline::build_graph(&config, false)?;

    let result = pipeline::run_traversals(&config, &graph);

    assert!(matches!(
        result,
        Err(PipelineError::Graph(flowviz_core::Error::NodeNotFound(99)))
    ));
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

/// # GIVEN
/// The built-in seven-node network
///
/// # WHEN
/// Max flow runs with both path searches
///
/// # THEN
/// Both find a flow of 15 and write `{search}_flow.gif` and `{search}_final.png`
#[test]
fn given_example_network_when_flows_run_then_animation_and_still_per_search() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut config = small_config(dir.path());
    config.example = true;
    let graph = pipeline::build_graph(&config, true)?;

    let outputs = pipeline::run_flows(&config, &graph)?;

    assert_eq!(outputs.len(), 2);
    for output in &outputs {
        assert!((output.max_flow - 15.0).abs() < 1e-9);
        let animation = output.animation.clone().unwrap_or_default();
        assert_eq!(animation, dir.path().join(format!("{}_flow.gif", output.search.slug())));
        assert_eq!(gif_frames(&animation)?, output.augmentations);
        assert_eq!(
            output.still,
            dir.path().join(format!("{}_final.png", output.search.slug()))
        );
        assert_eq!(image::image_dimensions(&output.still)?, (320, 240));
    }
    Ok(())
}

/// # GIVEN
/// A config file selecting DFS only, and a command line overriding the node count
///
/// # WHEN
/// The configuration is resolved
///
/// # THEN
/// File values survive except where the command line overrides them
#[test]
fn given_config_file_and_overrides_when_resolved_then_overrides_win() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("flowviz.toml");
    std::fs::write(
        &path,
        "[graph]\nnode_count = 8\nedge_count = 10\n\n[traversal]\nalgorithms = [\"dfs\"]\n",
    )?;

    let overrides = Overrides {
        config: Some(path),
        nodes: Some(12),
        output_dir: Some(PathBuf::from("frames")),
        ..Overrides::default()
    };
    let config = resolve_config(&overrides, None)?;

    assert_eq!(config.graph.node_count, 12);
    assert_eq!(config.graph.edge_count, 10);
    assert_eq!(config.traversal.algorithms, vec![Algorithm::Dfs]);
    assert_eq!(config.export.output_dir, PathBuf::from("frames"));
    Ok(())
}

/// # GIVEN
/// Overrides that ask for more edges than the node count allows
///
/// # WHEN
/// The configuration is resolved
///
/// # THEN
/// Resolution fails before any graph is generated
#[test]
fn given_impossible_edge_count_when_resolved_then_rejected() {
    let overrides = Overrides {
        nodes: Some(3),
        edges: Some(7),
        ..Overrides::default()
    };
    assert!(resolve_config(&overrides, None).is_err());
}

/// # GIVEN
/// A graph override that would be invalid for `traverse`
///
/// # WHEN
/// The configuration is resolved for `compare`, which builds its own graphs
///
/// # THEN
/// Resolution succeeds, while the same override still fails for `traverse`
#[test]
fn given_graph_override_when_resolved_for_compare_then_graph_is_not_checked() -> TestResult {
    let overrides = Overrides {
        nodes: Some(1),
        ..Overrides::default()
    };
    let compare = Commands::Compare {
        sizes: vec![10],
        edge_budget: 50,
        trials: 1,
        json: false,
    };
    let traverse = Commands::Traverse {
        start: None,
        algorithm: Vec::new(),
    };

    let config = resolve_config(&overrides, Some(&compare))?;

    assert_eq!(config.graph.node_count, 1);
    assert!(resolve_config(&overrides, Some(&traverse)).is_err());
    Ok(())
}

/// # GIVEN
/// A frame duration GIF delays cannot represent
///
/// # WHEN
/// The configuration is resolved
///
/// # THEN
/// Resolution fails instead of writing a zero-delay animation
#[test]
fn given_sub_centisecond_frame_when_resolved_then_rejected() {
    let overrides = Overrides {
        frame_ms: Some(5),
        ..Overrides::default()
    };
    assert!(resolve_config(&overrides, None).is_err());
}

/// # GIVEN
/// A two-size sweep with a fixed seed
///
/// # WHEN
/// The comparison runs
///
/// # THEN
/// Each size has a BFS and a DFS summary that agree on the flow value
#[test]
fn given_sweep_when_compared_then_searches_agree_on_flow() -> TestResult {
    let config = CompareConfig {
        sizes: vec![8, 16],
        edge_budget: 20,
        trials: 2,
        seed: 3,
    };

    let rows = run_comparison(&config)?;

    assert_eq!(rows.iter().map(|row| row.nodes).collect::<Vec<_>>(), vec![8, 16]);
    for row in &rows {
        let bfs = row.summary(PathSearch::Bfs).ok_or("missing bfs")?;
        let dfs = row.summary(PathSearch::Dfs).ok_or("missing dfs")?;
        assert!((bfs.mean_flow - dfs.mean_flow).abs() < 1e-6);
    }
    let json = serde_json::to_value(&rows)?;
    assert_eq!(json[0]["searches"][0]["search"], "bfs");
    Ok(())
}
