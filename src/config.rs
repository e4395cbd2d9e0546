//! Configuration for a visualization run.
//!
//! Every field has a default, so an empty file (or no file) is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use flowviz_core::{Algorithm, GeneratorConfig, NodeId, PathSearch};
use flowviz_render::{RenderError, RenderStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GIF frame delays are stored in hundredths of a second.
pub const GIF_DELAY_UNIT_MS: u64 = 10;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },

    #[error(transparent)]
    Graph(#[from] flowviz_core::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ConfigError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// Use the built-in seven-node network instead of generating from `graph`.
    #[serde(default)]
    pub example: bool,

    #[serde(default)]
    pub graph: GeneratorConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,

    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub render: RenderStyle,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Which traversals to record and from where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Start node for every traversal.
    #[serde(default)]
    pub start: NodeId,

    /// Algorithms to animate, in order.
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<Algorithm>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            start: 0,
            algorithms: default_algorithms(),
        }
    }
}

/// Max-flow run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Augmenting-path searches to run, in order.
    #[serde(default = "default_searches")]
    pub searches: Vec<PathSearch>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            searches: default_searches(),
        }
    }
}

/// Where and how animations are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Display time of each frame, in milliseconds. A positive multiple of
    /// [`GIF_DELAY_UNIT_MS`].
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl ExportConfig {
    #[must_use]
    pub const fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// `<output_dir>/<stem>.<extension>`
    #[must_use]
    pub fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{stem}.{extension}"))
    }
}

fn default_algorithms() -> Vec<Algorithm> {
    Algorithm::ALL.to_vec()
}

fn default_searches() -> Vec<PathSearch> {
    PathSearch::ALL.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_frame_ms() -> u64 {
    1000
}

impl VisualizerConfig {
    /// Parse a TOML document and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and a validation error for
    /// out-of-range values.
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config = Self::parse(source, origin)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`VisualizerConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file without validating it, so overrides can be
    /// applied first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source, path)
    }

    fn parse(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.example {
            self.graph.validate()?;
        }
        self.validate_without_graph()
    }

    /// Validate every section except `graph`, for commands that generate their
    /// own graphs.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate_without_graph(&self) -> Result<(), ConfigError> {
        self.render.validate()?;

        if self.traversal.algorithms.is_empty() {
            return Err(ConfigError::invalid("traversal.algorithms must not be empty"));
        }

        if self.flow.searches.is_empty() {
            return Err(ConfigError::invalid("flow.searches must not be empty"));
        }

        if self.export.frame_ms < GIF_DELAY_UNIT_MS || self.export.frame_ms % GIF_DELAY_UNIT_MS != 0 {
            return Err(ConfigError::invalid(format!(
                "export.frame_ms must be a positive multiple of {GIF_DELAY_UNIT_MS}, got {}",
                self.export.frame_ms
            )));
        }

        if self.export.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("export.output_dir must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VisualizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.output_dir, PathBuf::from("output"));
        assert_eq!(config.traversal.algorithms, vec![Algorithm::Bfs, Algorithm::Dfs]);
        assert_eq!(
            config.export.path_for("bfs_traversal", "gif"),
            PathBuf::from("output/bfs_traversal.gif")
        );
    }

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = VisualizerConfig::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, VisualizerConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let source = r#"
            [graph]
            node_count = 6
            seed = 9

            [traversal]
            start = 2
            algorithms = ["dfs"]

            [export]
            frame_ms = 250
        "#;
        let config = VisualizerConfig::from_toml_str(source, Path::new("t.toml")).unwrap();
        assert_eq!(config.graph.node_count, 6);
        assert_eq!(config.graph.edge_count, 20);
        assert_eq!(config.graph.seed, Some(9));
        assert_eq!(config.traversal.start, 2);
        assert_eq!(config.traversal.algorithms, vec![Algorithm::Dfs]);
        assert_eq!(config.export.frame_duration(), Duration::from_millis(250));
        assert_eq!(config.render, RenderStyle::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let too_many = "[graph]\nnode_count = 3\nedge_count = 7\n";
        assert!(matches!(
            VisualizerConfig::from_toml_str(too_many, Path::new("t.toml")),
            Err(ConfigError::Graph(flowviz_core::Error::TooManyEdges { .. }))
        ));

        let zero_frame = "[export]\nframe_ms = 0\n";
        assert!(matches!(
            VisualizerConfig::from_toml_str(zero_frame, Path::new("t.toml")),
            Err(ConfigError::Invalid { .. })
        ));

        let bad_style = "[render]\nwidth = 70000\n";
        assert!(matches!(
            VisualizerConfig::from_toml_str(bad_style, Path::new("t.toml")),
            Err(ConfigError::Render(_))
        ));

        let bad_style = "[render]\nnode_radius = 0\n";
        assert!(matches!(
            VisualizerConfig::from_toml_str(bad_style, Path::new("t.toml")),
            Err(ConfigError::Render(_))
        ));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let result = VisualizerConfig::from_toml_str("[graph\n", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_frame_duration_must_fit_gif_delay_units() {
        for frame_ms in [0, 5, 255] {
            let source = format!("[export]\nframe_ms = {frame_ms}\n");
            let result = VisualizerConfig::from_toml_str(&source, Path::new("t.toml"));
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "frame_ms = {frame_ms} should be rejected"
            );
        }

        let source = "[export]\nframe_ms = 10\n";
        let config = VisualizerConfig::from_toml_str(source, Path::new("t.toml")).unwrap();
        assert_eq!(config.export.frame_duration(), Duration::from_millis(10));
    }

    #[test]
    fn test_graph_section_can_be_skipped() {
        let mut config = VisualizerConfig::default();
        config.graph.node_count = 1;
        config.graph.edge_count = 5;
        assert!(config.validate().is_err());
        assert!(config.validate_without_graph().is_ok());
    }

    #[test]
    fn test_read_defers_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowviz.toml");
        std::fs::write(&path, "[graph]\nnode_count = 1\nedge_count = 5\n").unwrap();

        let config = VisualizerConfig::read(&path).unwrap();
        assert_eq!(config.graph.node_count, 1);
        assert!(matches!(
            VisualizerConfig::load(&path),
            Err(ConfigError::Graph(_))
        ));
    }
}
