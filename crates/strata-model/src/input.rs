//! Decoded layered-design input.
//!
//! These records are produced by the container decoder, which lives outside
//! this crate. They can be handed over in memory or parsed from JSON.

use serde::{Deserialize, Serialize};
use strata_core::{Alignment, Color, Frame, Gradient, Point};

fn default_dpi() -> f64 {
    72.0
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// A decoded document: canvas size plus layers in paint order, bottom first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedDocument {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_dpi")]
    pub dpi: f64,
    #[serde(default)]
    pub layers: Vec<LayerRecord>,
}

impl DecodedDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            dpi: default_dpi(),
            layers: Vec::new(),
        }
    }

    /// Add a top-level layer above the existing ones.
    pub fn with_layer(mut self, layer: LayerRecord) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One layer of the decoded tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_opacity")]
    pub fill_opacity: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub content: LayerContent,
}

impl LayerRecord {
    pub fn new(name: impl Into<String>, content: LayerContent) -> Self {
        Self {
            name: name.into(),
            opacity: 1.0,
            fill_opacity: 1.0,
            visible: true,
            content,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_fill_opacity(mut self, fill_opacity: f64) -> Self {
        self.fill_opacity = fill_opacity;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Kind-specific payload of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContent {
    Group {
        #[serde(default)]
        children: Vec<LayerRecord>,
        #[serde(default)]
        bounds: Option<Frame>,
    },
    Shape {
        subpaths: Vec<Subpath>,
        #[serde(default)]
        fill: Option<Color>,
        /// Gradient overlay; wins over `fill` where the target supports it.
        #[serde(default)]
        gradient: Option<Gradient>,
        #[serde(default)]
        stroke: Option<StrokeStyle>,
        /// From live rounded-rectangle origination data.
        #[serde(default)]
        corner_radius: Option<f64>,
    },
    Text {
        spans: Vec<StyleSpan>,
        layout: TextLayout,
        #[serde(default)]
        alignment: Alignment,
    },
    Image {
        bounds: Frame,
        source: RasterSource,
    },
    /// Color adjustment layers have no presentation counterpart.
    Adjustment { adjustment: String },
    #[serde(other)]
    Unknown,
}

impl LayerContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LayerContent::Group { .. } => "group",
            LayerContent::Shape { .. } => "shape",
            LayerContent::Text { .. } => "text",
            LayerContent::Image { .. } => "image",
            LayerContent::Adjustment { .. } => "adjustment",
            LayerContent::Unknown => "unknown",
        }
    }
}

/// A vector anchor with optional Bezier handles.
///
/// Handles are absolute canvas positions, as stored in the knot records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub point: Point,
    #[serde(default)]
    pub incoming: Option<Point>,
    #[serde(default)]
    pub outgoing: Option<Point>,
}

impl Anchor {
    pub fn corner(x: f64, y: f64) -> Self {
        Self {
            point: Point::new(x, y),
            incoming: None,
            outgoing: None,
        }
    }

    pub fn smooth(point: Point, incoming: Point, outgoing: Point) -> Self {
        Self {
            point,
            incoming: Some(incoming),
            outgoing: Some(outgoing),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subpath {
    pub anchors: Vec<Anchor>,
    #[serde(default)]
    pub closed: bool,
}

impl Subpath {
    /// A closed, axis-aligned rectangle.
    pub fn rectangle(frame: Frame) -> Self {
        Self {
            anchors: vec![
                Anchor::corner(frame.x, frame.y),
                Anchor::corner(frame.right(), frame.y),
                Anchor::corner(frame.right(), frame.bottom()),
                Anchor::corner(frame.x, frame.bottom()),
            ],
            closed: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
}

/// Characters sharing one decoded style record.
///
/// Adjacent spans may carry identical styles; the segmenter merges them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpan {
    pub text: String,
    pub font_family: String,
    pub size: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl StyleSpan {
    pub fn new(text: impl Into<String>, font_family: impl Into<String>, size: f64, color: Color) -> Self {
        Self {
            text: text.into(),
            font_family: font_family.into(),
            size,
            color,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TextLayout {
    /// Non-reflowing text; `origin` is the top-left of the text block.
    Point { origin: Point },
    /// Reflowing text inside a declared box.
    Paragraph { bounds: Frame },
}

/// Pixel data of an image layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RasterSource {
    /// RGBA8 pixels, row major.
    Embedded { width: u32, height: u32, pixels: Vec<u8> },
    /// The original bytes of an externally linked file.
    Linked { file_name: String, data: Vec<u8> },
}
