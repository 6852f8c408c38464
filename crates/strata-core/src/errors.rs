//! Error types raised while building a document.

use thiserror::Error;

/// Result type alias for model construction.
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Errors during construction of the intermediate document.
///
/// Every variant is fatal to the current export.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unsupported layer kind '{kind}' on layer '{layer}'")]
    UnsupportedNodeKind { kind: String, layer: String },

    #[error("Malformed path on layer '{layer}': {reason}")]
    MalformedPath { layer: String, reason: String },

    #[error("Could not find a unique name for '{base}' after {attempts} attempts")]
    NameCollisionUnresolved { base: String, attempts: usize },

    #[error("Malformed fill on layer '{layer}': {reason}")]
    MalformedFill { layer: String, reason: String },

    #[error("Malformed raster on layer '{layer}': {reason}")]
    MalformedRaster { layer: String, reason: String },

    #[error("Malformed text on layer '{layer}': {reason}")]
    MalformedText { layer: String, reason: String },

    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
}

impl BuildError {
    pub fn malformed_path(layer: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            layer: layer.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed_fill(layer: &str, reason: impl Into<String>) -> Self {
        Self::MalformedFill {
            layer: layer.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed_raster(layer: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRaster {
            layer: layer.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed_text(layer: &str, reason: impl Into<String>) -> Self {
        Self::MalformedText {
            layer: layer.to_string(),
            reason: reason.into(),
        }
    }
}
