//! Error types for code emission.

use std::path::PathBuf;

use strata_core::BuildError;
use thiserror::Error;

/// Result type alias for codegen operations.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur while emitting a target.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// The document could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Persisting an extracted asset failed.
    #[error("Failed to write asset {}: {source}", path.display())]
    AssetWriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An embedded raster could not be encoded.
    #[error("Failed to encode asset '{name}': {reason}")]
    AssetEncode { name: String, reason: String },

    /// Template rendering error.
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::RenderError),

    /// Invalid template.
    #[error("Invalid template: {0}")]
    InvalidTemplate(#[from] handlebars::TemplateError),

    /// Requested target name is not known.
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
