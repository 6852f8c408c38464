//! Number, color, string and asset helpers shared by the backends.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use strata_core::{AssetRef, Color, EmbeddingKind};

use crate::error::{CodegenError, Result};

/// Round to `decimals` places, mapping negative zero to zero.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Fixed one-decimal form, e.g. `320.0`.
pub fn fixed1(value: f64) -> String {
    format!("{:.1}", round_to(value, 1))
}

/// Shortest form rounded to `decimals` places, e.g. `320` or `12.5`.
pub fn short(value: f64, decimals: i32) -> String {
    format!("{}", round_to(value, decimals))
}

/// Font sizes are whole points.
pub fn font_points(size: f64) -> i64 {
    size.round() as i64
}

pub fn swift_color(color: &Color) -> String {
    match color.a {
        Some(alpha) => format!(
            "Color(red: {:.3}, green: {:.3}, blue: {:.3}, opacity: {})",
            round_to(color.r, 3),
            round_to(color.g, 3),
            round_to(color.b, 3),
            short(alpha, 2)
        ),
        None => format!(
            "Color(red: {:.3}, green: {:.3}, blue: {:.3})",
            round_to(color.r, 3),
            round_to(color.g, 3),
            round_to(color.b, 3)
        ),
    }
}

/// CSS color: `#rrggbb`, or `rgba(...)` when translucent.
pub fn css_color(color: &Color) -> String {
    let (r, g, b) = color.to_rgb8();
    match color.a {
        Some(alpha) => format!("rgba({}, {}, {}, {})", r, g, b, short(alpha, 2)),
        None => format!("#{:02x}{:02x}{:02x}", r, g, b),
    }
}

/// Escape text for a Swift string literal.
pub fn swift_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Text as a JSX child: raw when it survives JSX parsing unchanged,
/// otherwise a string expression.
pub fn jsx_text(text: &str) -> String {
    let raw_safe = !text.is_empty()
        && text.trim() == text
        && !text.contains(['{', '}', '<', '>', '&', '\n', '\r', '\t', '"', '\'']);
    if raw_safe {
        text.to_string()
    } else {
        format!("{{{}}}", serde_json::Value::String(text.to_string()))
    }
}

/// Quote a string for a JS source literal.
pub fn js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Bytes of the image file written for `asset`.
///
/// Embedded rasters are encoded to PNG; linked files are copied unchanged.
pub fn asset_bytes(asset: &AssetRef) -> Result<Vec<u8>> {
    match (asset.kind, asset.pixel_size) {
        (EmbeddingKind::Embedded, Some((width, height))) => {
            let mut png = Vec::new();
            PngEncoder::new(&mut png)
                .write_image(&asset.bytes, width, height, ExtendedColorType::Rgba8)
                .map_err(|e| CodegenError::AssetEncode {
                    name: asset.name.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(png)
        }
        (EmbeddingKind::Embedded, None) => Err(CodegenError::AssetEncode {
            name: asset.name.to_string(),
            reason: "embedded asset has no pixel size".to_string(),
        }),
        (EmbeddingKind::Linked, _) => Ok(asset.bytes.to_vec()),
    }
}

pub fn indent(level: usize, width: usize) -> String {
    " ".repeat(level * width)
}
