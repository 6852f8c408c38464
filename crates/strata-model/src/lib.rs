//! Builds the strata intermediate document from decoded design input.
//!
//! The builder threads a per-run [`ExportContext`] through:
//! - name sanitization ([`naming`])
//! - content-hash asset deduplication ([`assets`])
//! - vector path translation ([`path`])
//! - text run segmentation and measurement ([`text`])
//!
//! # Example
//!
//! ```ignore
//! use strata_model::{DecodedDocument, ModelBuilder};
//!
//! let input = DecodedDocument::from_json(&json)?;
//! let document = ModelBuilder::new().build(&input)?;
//! ```

pub mod assets;
pub mod builder;
pub mod input;
pub mod naming;
pub mod path;
pub mod text;

pub use assets::AssetRegistry;
pub use builder::{ExportContext, ModelBuilder, ROOT_ID};
pub use input::{
    Anchor, DecodedDocument, LayerContent, LayerRecord, RasterSource, StrokeStyle, StyleSpan,
    Subpath, TextLayout,
};
pub use naming::{NameKind, NameRegistry};
pub use text::{EstimatingMeasurer, TextMeasurer};

use strata_core::{BuildResult, Document};

/// Build a document with the default text measurer.
pub fn build(input: &DecodedDocument) -> BuildResult<Document> {
    ModelBuilder::new().build(input)
}
