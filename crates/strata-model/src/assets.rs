//! Content-addressed raster asset registry.
//!
//! Registration only records assets; the emission stage writes them out.

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use sha2::{Digest, Sha256};
use strata_core::{AssetRef, BuildError, BuildResult, ContentHash, EmbeddingKind, Identifier};

use crate::input::RasterSource;
use crate::naming::{self, NameKind, NameRegistry};

/// Hash the content of a raster source.
///
/// Embedded rasters hash their declared dimensions along with the pixels so
/// that two buffers with the same bytes but different shapes stay distinct.
pub fn content_hash(source: &RasterSource) -> ContentHash {
    let mut hasher = Sha256::new();
    match source {
        RasterSource::Embedded {
            width,
            height,
            pixels,
        } => {
            hasher.update(width.to_le_bytes());
            hasher.update(height.to_le_bytes());
            hasher.update(pixels);
        }
        RasterSource::Linked { data, .. } => hasher.update(data),
    }
    ContentHash(hasher.finalize().into())
}

/// Deduplicates assets by content hash for one export run.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    by_hash: IndexMap<ContentHash, Arc<AssetRef>>,
    names: NameRegistry,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self {
            by_hash: IndexMap::new(),
            names: NameRegistry::new(),
        }
    }

    /// Return the asset for `source`, registering it on first sight.
    pub fn register(&mut self, source: &RasterSource, layer: &str) -> BuildResult<Arc<AssetRef>> {
        validate(source, layer)?;

        let hash = content_hash(source);
        if let Some(existing) = self.by_hash.get(&hash) {
            debug!(asset = existing.name.as_str(), layer = layer; "Reusing deduplicated asset");
            return Ok(Arc::clone(existing));
        }

        let asset = match source {
            RasterSource::Embedded {
                width,
                height,
                pixels,
            } => {
                let stem = naming::sanitize(layer);
                let stem = if naming::is_degenerate(&stem) {
                    NameKind::Image.fallback_token().to_string()
                } else {
                    stem
                };
                let name = self
                    .names
                    .issue(&format!("{}_{}", stem, hash.short()), NameKind::Asset)?;
                AssetRef {
                    hash,
                    file_name: format!("{}.png", name),
                    name,
                    bytes: Arc::from(pixels.as_slice()),
                    kind: EmbeddingKind::Embedded,
                    pixel_size: Some((*width, *height)),
                }
            }
            RasterSource::Linked { file_name, data } => {
                let (stem, extension) = split_file_name(file_name);
                let name: Identifier = self.names.issue(stem, NameKind::Asset)?;
                AssetRef {
                    hash,
                    file_name: format!("{}.{}", name, extension),
                    name,
                    bytes: Arc::from(data.as_slice()),
                    kind: EmbeddingKind::Linked,
                    pixel_size: None,
                }
            }
        };

        let asset = Arc::new(asset);
        self.by_hash.insert(hash, Arc::clone(&asset));
        Ok(asset)
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    /// Assets scheduled for writing, in registration order.
    pub fn pending(&self) -> impl Iterator<Item = &Arc<AssetRef>> {
        self.by_hash.values()
    }

    pub fn into_pending(self) -> Vec<Arc<AssetRef>> {
        self.by_hash.into_values().collect()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(source: &RasterSource, layer: &str) -> BuildResult<()> {
    match source {
        RasterSource::Embedded {
            width,
            height,
            pixels,
        } => {
            if *width == 0 || *height == 0 {
                return Err(BuildError::malformed_raster(layer, "raster has zero size"));
            }
            let expected = *width as usize * *height as usize * 4;
            if pixels.len() != expected {
                return Err(BuildError::malformed_raster(
                    layer,
                    format!(
                        "expected {} bytes for {}x{} RGBA, found {}",
                        expected,
                        width,
                        height,
                        pixels.len()
                    ),
                ));
            }
        }
        RasterSource::Linked { data, .. } => {
            if data.is_empty() {
                return Err(BuildError::malformed_raster(layer, "linked file is empty"));
            }
        }
    }
    Ok(())
}

/// Split a linked file name into stem and lowercase extension (default `png`).
fn split_file_name(file_name: &str) -> (&str, String) {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext.to_ascii_lowercase()),
        _ => (base, "png".to_string()),
    }
}
