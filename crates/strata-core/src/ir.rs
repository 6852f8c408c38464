//! The immutable intermediate document tree.
//!
//! A [`Document`] is built once per export by the model builder and is
//! read-only afterwards, so any number of backends may walk it concurrently.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::types::{Alignment, Color, Frame, Gradient, Identifier, Point, Size, WrapMode};

/// A fully built layered design.
#[derive(Debug, Clone)]
pub struct Document {
    canvas_width: u32,
    canvas_height: u32,
    dpi: f64,
    root: GroupNode,
    assets: Vec<Arc<AssetRef>>,
}

impl Document {
    pub fn new(
        canvas_width: u32,
        canvas_height: u32,
        dpi: f64,
        root: GroupNode,
        assets: Vec<Arc<AssetRef>>,
    ) -> Self {
        Self {
            canvas_width,
            canvas_height,
            dpi,
            root,
            assets,
        }
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width as f64, self.canvas_height as f64)
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    pub fn root(&self) -> &GroupNode {
        &self.root
    }

    /// Unique assets referenced by the tree, in first-use order.
    pub fn assets(&self) -> &[Arc<AssetRef>] {
        &self.assets
    }

    /// Visit every node depth-first, parents before children.
    pub fn walk<F: FnMut(&Node, usize)>(&self, mut visit: F) {
        fn go<F: FnMut(&Node, usize)>(nodes: &[Node], depth: usize, visit: &mut F) {
            for node in nodes {
                visit(node, depth);
                if let Node::Group(group) = node {
                    go(&group.children, depth + 1, visit);
                }
            }
        }
        go(&self.root.children, 0, &mut visit);
    }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }
}

/// Discriminant of a [`Node`], used for logging and naming fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    Shape,
    Text,
    Image,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Group => "group",
            NodeKind::Shape => "shape",
            NodeKind::Text => "text",
            NodeKind::Image => "image",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of the document tree.
#[derive(Debug, Clone)]
pub enum Node {
    Group(GroupNode),
    Shape(ShapeNode),
    Text(TextNode),
    Image(ImageNode),
}

impl Node {
    pub fn meta(&self) -> &NodeMeta {
        match self {
            Node::Group(n) => &n.meta,
            Node::Shape(n) => &n.meta,
            Node::Text(n) => &n.meta,
            Node::Image(n) => &n.meta,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Group(_) => NodeKind::Group,
            Node::Shape(_) => NodeKind::Shape,
            Node::Text(_) => NodeKind::Text,
            Node::Image(_) => NodeKind::Image,
        }
    }

    pub fn id(&self) -> &Identifier {
        &self.meta().id
    }

    pub fn frame(&self) -> Frame {
        self.meta().frame
    }

    pub fn opacity(&self) -> Option<f64> {
        self.meta().opacity
    }
}

/// Properties shared by every node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMeta {
    /// Sanitized identifier, unique within the document.
    pub id: Identifier,
    /// Layer name as it appeared in the source.
    pub name: String,
    /// Absolute canvas frame, top-left origin.
    pub frame: Frame,
    /// Present only when below 1.
    pub opacity: Option<f64>,
    pub hidden: bool,
}

/// Ordered children; the first child paints underneath.
#[derive(Debug, Clone)]
pub struct GroupNode {
    pub meta: NodeMeta,
    pub children: Vec<Node>,
}

/// A single curve command of a vector path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    Move(Point),
    CubicCurve {
        end: Point,
        control1: Point,
        control2: Point,
    },
    Close,
}

/// Stroke style of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// The primitive a backend should draw for a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapePrimitive {
    Rectangle(Frame),
    RoundedRectangle { frame: Frame, radius: f64 },
    Path,
}

/// A vector shape. `meta.frame` bounds the path geometry only.
#[derive(Debug, Clone)]
pub struct ShapeNode {
    pub meta: NodeMeta,
    /// Absolute canvas coordinates; one `Move` per subpath.
    pub commands: Vec<PathCommand>,
    pub fill: Option<Color>,
    /// Takes precedence over `fill` where the target supports gradients.
    pub gradient: Option<Gradient>,
    pub stroke: Option<Stroke>,
    /// Set for live rounded-rectangle shapes; always positive.
    pub corner_radius: Option<f64>,
}

impl ShapeNode {
    /// Frame covering the path and its stroke.
    ///
    /// Strokes are centered on the path, so half of the width lies outside
    /// the geometry on every side.
    pub fn outer_frame(&self) -> Frame {
        match self.stroke_outset() {
            outset if outset > 0.0 => self.meta.frame.outset(outset),
            _ => self.meta.frame,
        }
    }

    /// How far the stroke reaches past the geometry on each side.
    pub fn stroke_outset(&self) -> f64 {
        self.stroke.map_or(0.0, |stroke| stroke.width.max(0.0) / 2.0)
    }

    pub fn primitive(&self) -> ShapePrimitive {
        if let Some(radius) = self.corner_radius {
            return ShapePrimitive::RoundedRectangle {
                frame: self.meta.frame,
                radius,
            };
        }
        match self.as_rectangle() {
            Some(frame) => ShapePrimitive::Rectangle(frame),
            None => ShapePrimitive::Path,
        }
    }

    /// Every anchor and control point of the path.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.commands.iter().flat_map(|cmd| {
            let pts: SmallVec<[Point; 3]> = match *cmd {
                PathCommand::Move(p) => SmallVec::from_slice(&[p]),
                PathCommand::CubicCurve {
                    end,
                    control1,
                    control2,
                } => SmallVec::from_slice(&[control1, control2, end]),
                PathCommand::Close => SmallVec::new(),
            };
            pts.into_iter()
        })
    }

    /// The rectangle this path traces, if it is a single closed subpath of
    /// four straight, axis-aligned edges.
    pub fn as_rectangle(&self) -> Option<Frame> {
        let mut cmds = self.commands.iter();
        let start = match cmds.next()? {
            PathCommand::Move(p) => *p,
            _ => return None,
        };

        let mut vertices: SmallVec<[Point; 5]> = SmallVec::new();
        vertices.push(start);
        let mut current = start;
        let mut closed = false;

        for cmd in cmds {
            if closed {
                return None;
            }
            match *cmd {
                PathCommand::Move(_) => return None,
                PathCommand::CubicCurve {
                    end,
                    control1,
                    control2,
                } => {
                    if !near(control1, current) || !near(control2, end) {
                        return None;
                    }
                    if !near(end, current) {
                        if vertices.len() == 5 {
                            return None;
                        }
                        vertices.push(end);
                    }
                    current = end;
                }
                PathCommand::Close => closed = true,
            }
        }

        if vertices.len() == 5 && near(vertices[4], start) {
            vertices.pop();
            closed = true;
        }
        if !closed || vertices.len() != 4 {
            return None;
        }

        let mut horizontal = Vec::with_capacity(4);
        for i in 0..4 {
            let a = vertices[i];
            let b = vertices[(i + 1) % 4];
            let flat_y = (a.y - b.y).abs() < EPSILON;
            let flat_x = (a.x - b.x).abs() < EPSILON;
            match (flat_x, flat_y) {
                (false, true) => horizontal.push(true),
                (true, false) => horizontal.push(false),
                _ => return None,
            }
        }
        if horizontal.windows(2).any(|w| w[0] == w[1]) {
            return None;
        }

        Frame::from_points(vertices.iter().copied())
    }
}

const EPSILON: f64 = 1e-6;

fn near(a: Point, b: Point) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

/// A maximal span of uniformly styled text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font_family: String,
    pub size: f64,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
}

impl TextRun {
    pub fn same_style(&self, other: &TextRun) -> bool {
        self.font_family == other.font_family
            && self.size == other.size
            && self.color == other.color
            && self.bold == other.bold
            && self.italic == other.italic
    }
}

/// Part of a run that falls on one visual line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSlice {
    /// Index into [`TextNode::runs`].
    pub run: usize,
    pub text: String,
}

/// Slices sharing one baseline-aligned line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunRow {
    pub slices: SmallVec<[RunSlice; 4]>,
}

#[derive(Debug, Clone)]
pub struct TextNode {
    pub meta: NodeMeta,
    pub runs: Vec<TextRun>,
    /// Visual lines of the runs, in reading order.
    pub rows: Vec<RunRow>,
    pub wrap: WrapMode,
    pub alignment: Alignment,
}

impl TextNode {
    pub fn is_single_run(&self) -> bool {
        self.runs.len() == 1
    }
}

#[derive(Debug, Clone)]
pub struct ImageNode {
    pub meta: NodeMeta,
    pub asset: Arc<AssetRef>,
}

/// SHA-256 digest of an asset's content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// First eight hex digits.
    pub fn short(&self) -> String {
        self.0[..4].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

/// Where an asset's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingKind {
    /// Raw RGBA8 pixels stored inside the design file.
    Embedded,
    /// An external file referenced by the design; bytes are the encoded file.
    Linked,
}

/// A deduplicated binary resource.
#[derive(Debug, Clone)]
pub struct AssetRef {
    pub hash: ContentHash,
    /// Identifier used by generated code (catalog name).
    pub name: Identifier,
    /// File name in the target's asset directory.
    pub file_name: String,
    pub bytes: Arc<[u8]>,
    pub kind: EmbeddingKind,
    /// Pixel dimensions of embedded rasters.
    pub pixel_size: Option<(u32, u32)>,
}
