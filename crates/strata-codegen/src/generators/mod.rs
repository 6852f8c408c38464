//! Per-target backends.

mod react_native;
mod swiftui;

pub(crate) mod common;
pub mod templates;

pub use react_native::ReactNativeBackend;
pub use swiftui::SwiftUiBackend;
pub use templates::TemplateEngine;

use std::fmt;
use std::str::FromStr;

use strata_core::{AssetRef, Document, GroupNode, ImageNode, ShapeNode, TextNode};

use crate::error::{CodegenError, Result};

/// Renders document nodes for one target framework.
///
/// Every method only reads the document. The orchestrator calls the node
/// methods bottom-up, so a group receives its children already rendered.
pub trait Backend {
    /// Output of a single node.
    type Fragment;

    fn target(&self) -> Target;

    fn render_group(&self, node: &GroupNode, children: Vec<Self::Fragment>) -> Result<Self::Fragment>;

    /// Axis-aligned rectangles must come out as the target's rectangle primitive.
    fn render_shape(&self, node: &ShapeNode) -> Result<Self::Fragment>;

    /// One styled text for a single run; a run-row layout otherwise.
    fn render_text(&self, node: &TextNode) -> Result<Self::Fragment>;

    fn render_image(&self, node: &ImageNode) -> Result<Self::Fragment>;

    /// Wrap the rendered root children in a canvas-sized container and
    /// produce the target's source files.
    fn render_document(&self, doc: &Document, children: Vec<Self::Fragment>) -> Result<Vec<GeneratedFile>>;

    /// Files written for one deduplicated asset.
    fn asset_files(&self, asset: &AssetRef) -> Result<Vec<GeneratedFile>>;
}

/// Supported target frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    SwiftUi,
    ReactNative,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::SwiftUi, Target::ReactNative];

    pub fn name(&self) -> &'static str {
        match self {
            Target::SwiftUi => "swiftui",
            Target::ReactNative => "react-native",
        }
    }

    /// Directory under the output root that holds this target's files.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Target::SwiftUi => "SwiftUI",
            Target::ReactNative => "ReactNative",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "swiftui" | "swift" => Ok(Target::SwiftUi),
            "react-native" | "reactnative" | "react_native" | "rn" => Ok(Target::ReactNative),
            _ => Err(CodegenError::UnknownTarget(s.to_string())),
        }
    }
}

/// A generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the target directory, `/` separated.
    pub path: String,
    pub contents: Vec<u8>,
    /// Whether this is an extracted asset rather than source or manifest.
    pub is_asset: bool,
}

impl GeneratedFile {
    pub fn source(path: impl Into<String>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents: contents.into_bytes(),
            is_asset: false,
        }
    }

    pub fn asset(path: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            contents,
            is_asset: true,
        }
    }

    /// Contents as text, for source and manifest files.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}

/// All files emitted for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    pub target: Target,
    pub files: Vec<GeneratedFile>,
}

impl FileSet {
    pub fn get(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// The generated view or component source.
    pub fn source(&self) -> Option<&str> {
        self.files
            .iter()
            .find(|f| !f.is_asset && !f.path.ends_with(".json"))
            .and_then(GeneratedFile::text)
    }

    pub fn assets(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter().filter(|f| f.is_asset)
    }
}
