//! Code generation from strata documents to native UI frameworks.
//!
//! A built [`Document`](strata_core::Document) is walked once per target by
//! a [`Backend`]. Each walk yields a [`FileSet`] that is written atomically
//! under its own directory.
//!
//! # Targets
//!
//! - `swiftui` - a SwiftUI view plus an asset catalog
//! - `react-native` - a TSX screen component plus an image folder
//!
//! # Example
//!
//! ```ignore
//! use strata_codegen::{export, ExportOptions, Target};
//!
//! let options = ExportOptions::new().with_component_name("Landing");
//! export(&input, &Target::ALL, &options, Path::new("out"))?;
//! ```

pub mod error;
pub mod generators;
pub mod options;
pub mod orchestrator;

pub use error::{CodegenError, Result};
pub use generators::{
    Backend, FileSet, GeneratedFile, ReactNativeBackend, SwiftUiBackend, Target, TemplateEngine,
};
pub use options::{ExportOptions, Resolution, Scale};
pub use orchestrator::{emit, emit_all, emit_with, export, render_node};
