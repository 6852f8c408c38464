//! Assembles the immutable document from decoded layers.

use log::{debug, info, warn};
use strata_core::{
    BuildError, BuildResult, Document, Frame, Gradient, GradientKind, GroupNode, Identifier,
    ImageNode, Node, NodeMeta, ShapeNode, Stroke, TextNode, WrapMode,
};

use crate::assets::AssetRegistry;
use crate::input::{DecodedDocument, LayerContent, LayerRecord, TextLayout};
use crate::naming::{NameKind, NameRegistry};
use crate::path;
use crate::text::{self, EstimatingMeasurer, TextMeasurer};

/// Identifier of the canvas-sized root group.
pub const ROOT_ID: &str = "root";

/// Naming and dedup state for a single export run.
///
/// A fresh context is created for every build and dropped when it finishes,
/// so independent documents never share names or assets.
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub names: NameRegistry,
    pub assets: AssetRegistry,
}

impl ExportContext {
    pub fn new() -> Self {
        let mut names = NameRegistry::new();
        names.reserve(ROOT_ID);
        Self {
            names,
            assets: AssetRegistry::new(),
        }
    }
}

impl Default for ExportContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds [`Document`]s from decoded input.
pub struct ModelBuilder {
    measurer: Box<dyn TextMeasurer>,
}

impl ModelBuilder {
    /// A builder using [`EstimatingMeasurer`] for point text.
    pub fn new() -> Self {
        Self::with_measurer(EstimatingMeasurer::default())
    }

    pub fn with_measurer(measurer: impl TextMeasurer + 'static) -> Self {
        Self {
            measurer: Box::new(measurer),
        }
    }

    pub fn build(&self, input: &DecodedDocument) -> BuildResult<Document> {
        if input.width == 0 || input.height == 0 {
            return Err(BuildError::InvalidCanvas {
                width: input.width,
                height: input.height,
            });
        }

        let mut ctx = ExportContext::new();
        let children = self.build_layers(&input.layers, &mut ctx)?;

        let root = GroupNode {
            meta: NodeMeta {
                id: Identifier::from(ROOT_ID),
                name: ROOT_ID.to_string(),
                frame: Frame::new(0.0, 0.0, input.width as f64, input.height as f64),
                opacity: None,
                hidden: false,
            },
            children,
        };
        let assets = ctx.assets.into_pending();
        let document = Document::new(input.width, input.height, input.dpi, root, assets);

        info!(
            width = input.width,
            height = input.height,
            nodes = document.node_count(),
            assets = document.assets().len();
            "Built document"
        );
        Ok(document)
    }

    fn build_layers(&self, layers: &[LayerRecord], ctx: &mut ExportContext) -> BuildResult<Vec<Node>> {
        layers.iter().map(|layer| self.build_layer(layer, ctx)).collect()
    }

    fn build_layer(&self, layer: &LayerRecord, ctx: &mut ExportContext) -> BuildResult<Node> {
        let name = layer.name.as_str();
        let node = match &layer.content {
            LayerContent::Group { children, bounds } => {
                let id = ctx.names.issue(name, NameKind::Group)?;
                let children = self.build_layers(children, ctx)?;
                let frame = children
                    .iter()
                    .filter_map(extent)
                    .reduce(|a, b| a.union(&b))
                    .or(*bounds)
                    .unwrap_or(Frame::ZERO);
                Node::Group(GroupNode {
                    meta: meta(layer, id, frame),
                    children,
                })
            }
            LayerContent::Shape {
                subpaths,
                fill,
                gradient,
                stroke,
                corner_radius,
            } => {
                let commands = path::translate(subpaths, name)?;
                if let Some(gradient) = gradient {
                    validate_gradient(gradient, name)?;
                }
                let id = ctx.names.issue(name, NameKind::Shape)?;
                let mut shape = ShapeNode {
                    meta: meta(layer, id, Frame::ZERO),
                    commands,
                    fill: *fill,
                    gradient: gradient.clone(),
                    stroke: stroke.as_ref().map(|s| Stroke {
                        color: s.color,
                        width: s.width,
                    }),
                    corner_radius: None,
                };
                shape.meta.frame = Frame::from_points(shape.points()).unwrap_or(Frame::ZERO);
                shape.corner_radius = resolve_corner_radius(*corner_radius, shape.meta.frame, name)?;
                Node::Shape(shape)
            }
            LayerContent::Text {
                spans,
                layout,
                alignment,
            } => {
                if spans.is_empty() {
                    return Err(BuildError::malformed_text(name, "text layer has no style spans"));
                }
                let runs = text::segment(spans);
                let rows = text::rows(&runs);
                let frame = text::resolve_frame(layout, self.measurer.as_ref(), &runs, &rows);
                let wrap = match layout {
                    TextLayout::Point { .. } => WrapMode::Point,
                    TextLayout::Paragraph { .. } => WrapMode::Paragraph,
                };
                if wrap == WrapMode::Point && frame.is_empty() {
                    warn!(layer = name; "Point text measured to an empty frame");
                }
                let id = ctx.names.issue(name, NameKind::Text)?;
                Node::Text(TextNode {
                    meta: meta(layer, id, frame),
                    runs,
                    rows,
                    wrap,
                    alignment: *alignment,
                })
            }
            LayerContent::Image { bounds, source } => {
                if bounds.is_empty() {
                    return Err(BuildError::malformed_raster(name, "image has empty bounds"));
                }
                let asset = ctx.assets.register(source, name)?;
                let id = ctx.names.issue(name, NameKind::Image)?;
                Node::Image(ImageNode {
                    meta: meta(layer, id, *bounds),
                    asset,
                })
            }
            LayerContent::Adjustment { adjustment } => {
                return Err(BuildError::UnsupportedNodeKind {
                    kind: format!("adjustment ({})", adjustment),
                    layer: layer.name.clone(),
                });
            }
            LayerContent::Unknown => {
                return Err(BuildError::UnsupportedNodeKind {
                    kind: layer.content.kind_name().to_string(),
                    layer: layer.name.clone(),
                });
            }
        };

        debug!(
            layer = name,
            kind = node.kind().as_str(),
            id = node.id().as_str();
            "Built layer"
        );
        Ok(node)
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Area a child contributes to its group, or `None` when it has no extent.
fn extent(node: &Node) -> Option<Frame> {
    let frame = match node {
        Node::Shape(shape) => shape.outer_frame(),
        other => other.frame(),
    };
    (frame.width > 0.0 || frame.height > 0.0).then_some(frame)
}

fn validate_gradient(gradient: &Gradient, layer: &str) -> BuildResult<()> {
    if gradient.stops.is_empty() {
        return Err(BuildError::malformed_fill(layer, "gradient has no stops"));
    }
    if gradient.stops.iter().any(|stop| !stop.offset.is_finite()) {
        return Err(BuildError::malformed_fill(layer, "gradient stop offset is not finite"));
    }
    if let GradientKind::Radial { radius, .. } = gradient.kind {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(BuildError::malformed_fill(layer, "radial gradient needs a positive radius"));
        }
    }
    Ok(())
}

/// Positive radius clamped to half the shorter side; zero means square corners.
fn resolve_corner_radius(radius: Option<f64>, frame: Frame, layer: &str) -> BuildResult<Option<f64>> {
    match radius {
        None => Ok(None),
        Some(r) if !r.is_finite() || r < 0.0 => Err(BuildError::malformed_path(
            layer,
            format!("invalid corner radius {}", r),
        )),
        Some(r) if r == 0.0 => Ok(None),
        Some(r) => Ok(Some(r.min(frame.width.min(frame.height) / 2.0))),
    }
}

fn meta(layer: &LayerRecord, id: Identifier, frame: Frame) -> NodeMeta {
    let opacity = (layer.opacity * layer.fill_opacity).clamp(0.0, 1.0);
    NodeMeta {
        id,
        name: layer.name.clone(),
        frame,
        opacity: (opacity < 1.0).then_some(opacity),
        hidden: !layer.visible,
    }
}
