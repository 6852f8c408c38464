//! Export configuration.

use serde::{Deserialize, Serialize};
use strata_core::{Document, Frame, Point};

use crate::error::Result;
use crate::generators::templates::to_pascal_case;

/// Target output size in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Options applied to every emitted target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Base name of the generated view or component.
    pub component_name: String,
    /// Rescale all output coordinates to this size.
    pub resolution: Option<Resolution>,
    /// Extra multiplier on font sizes.
    pub font_scale: f64,
    /// Emitted as a comment header in every source file.
    pub license_text: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            component_name: "Main".to_string(),
            resolution: None,
            font_scale: 1.0,
            license_text: None,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component_name(mut self, name: impl Into<String>) -> Self {
        self.component_name = name.into();
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some(Resolution { width, height });
        self
    }

    pub fn with_font_scale(mut self, font_scale: f64) -> Self {
        self.font_scale = font_scale;
        self
    }

    pub fn with_license_text(mut self, text: impl Into<String>) -> Self {
        self.license_text = Some(text.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// PascalCase component name, falling back to `Main`.
    pub fn type_name(&self) -> String {
        let name = to_pascal_case(&strata_model::naming::sanitize(&self.component_name));
        if strata_model::naming::is_degenerate(&name) {
            "Main".to_string()
        } else {
            name
        }
    }

    /// Coordinate scaling from `doc`'s canvas to the output resolution.
    pub fn scale_for(&self, doc: &Document) -> Scale {
        let (x, y) = match self.resolution {
            Some(res) if res.width > 0 && res.height > 0 => (
                res.width as f64 / doc.canvas_width() as f64,
                res.height as f64 / doc.canvas_height() as f64,
            ),
            _ => (1.0, 1.0),
        };
        Scale {
            x,
            y,
            font: self.font_scale,
        }
    }
}

/// Per-axis output scaling, applied only at the backend boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
    pub font: f64,
}

impl Scale {
    pub const IDENTITY: Self = Self {
        x: 1.0,
        y: 1.0,
        font: 1.0,
    };

    pub fn frame(&self, frame: Frame) -> Frame {
        Frame::new(
            frame.x * self.x,
            frame.y * self.y,
            frame.width * self.x,
            frame.height * self.y,
        )
    }

    pub fn point(&self, p: Point) -> Point {
        Point::new(p.x * self.x, p.y * self.y)
    }

    /// Lengths without an axis, such as stroke widths.
    pub fn length(&self, value: f64) -> f64 {
        value * self.x.min(self.y)
    }

    pub fn font_size(&self, size: f64) -> f64 {
        size * self.y * self.font
    }
}
