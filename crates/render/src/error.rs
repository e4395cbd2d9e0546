//! Rendering and export errors.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for layout, rendering and export.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no frames to export to {}", .0.display())]
    EmptyAnimation(PathBuf),

    #[error("invalid layout parameter: {reason}")]
    InvalidLayout { reason: String },

    #[error("invalid render style: {reason}")]
    InvalidStyle { reason: String },

    #[error(transparent)]
    Graph(#[from] flowviz_core::Error),
}

impl RenderError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn encode(path: &Path, source: image::ImageError) -> Self {
        Self::Encode {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn invalid_layout(reason: impl Into<String>) -> Self {
        Self::InvalidLayout {
            reason: reason.into(),
        }
    }

    pub fn invalid_style(reason: impl Into<String>) -> Self {
        Self::InvalidStyle {
            reason: reason.into(),
        }
    }

    /// True when the failure came from the filesystem.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Result alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
