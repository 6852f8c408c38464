//! Core types and the intermediate document model for strata.
//!
//! This crate provides the foundational types shared by the model builder
//! and the code generators:
//! - Value types (frames, colors, identifiers)
//! - The immutable [`Document`] tree and its node variants
//! - Build error types

pub mod errors;
pub mod ir;
pub mod types;

pub use errors::*;
pub use ir::*;
pub use types::*;
