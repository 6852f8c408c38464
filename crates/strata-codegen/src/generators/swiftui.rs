//! SwiftUI backend.
//!
//! Every element carries an explicit `.frame` and a center-point
//! `.position`, laid out inside a canvas-sized `ZStack`. Groups render as
//! `Group`, which adds no layout of its own.

use serde_json::json;
use strata_core::{
    Alignment, AssetRef, Document, Frame, Gradient, GradientKind, GroupNode, ImageNode, NodeMeta,
    PathCommand, Point, ShapeNode, ShapePrimitive, TextNode, TextRun, WrapMode,
};

use super::common::{asset_bytes, fixed1, font_points, indent, short, swift_color, swift_string};
use super::templates::TemplateEngine;
use super::{Backend, GeneratedFile, Target};
use crate::error::Result;
use crate::options::{ExportOptions, Scale};

const INDENT: usize = 4;
const CATALOG: &str = "Assets.xcassets";

const VIEW_TEMPLATE: &str = r#"{{line_comment license}}import SwiftUI

struct {{name}}: View {
    var body: some View {
        ZStack {
{{body}}        }
        .frame(width: {{width}}, height: {{height}})
    }
}

#Preview {
    {{name}}()
}
"#;

/// A SwiftUI view expression with its modifier chain.
#[derive(Debug, Clone, PartialEq)]
pub struct SwiftView {
    head: String,
    body: SwiftBody,
    modifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum SwiftBody {
    None,
    Children(Vec<SwiftView>),
    /// Statements of a `Path { path in ... }` builder.
    Path(Vec<String>),
}

impl SwiftView {
    fn leaf(head: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            body: SwiftBody::None,
            modifiers: Vec::new(),
        }
    }

    fn container(head: impl Into<String>, children: Vec<SwiftView>) -> Self {
        Self {
            head: head.into(),
            body: SwiftBody::Children(children),
            modifiers: Vec::new(),
        }
    }

    fn path(statements: Vec<String>) -> Self {
        Self {
            head: "Path".to_string(),
            body: SwiftBody::Path(statements),
            modifiers: Vec::new(),
        }
    }

    fn modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    /// Write the view at `level`, without a trailing newline.
    pub fn write(&self, out: &mut String, level: usize) {
        let pad = indent(level, INDENT);
        out.push_str(&pad);
        out.push_str(&self.head);

        match &self.body {
            SwiftBody::None => {}
            SwiftBody::Children(children) => {
                out.push_str(" {\n");
                for child in children {
                    child.write(out, level + 1);
                    out.push('\n');
                }
                out.push_str(&pad);
                out.push('}');
            }
            SwiftBody::Path(statements) => {
                out.push_str(" { path in\n");
                let inner = indent(level + 1, INDENT);
                for statement in statements {
                    out.push_str(&inner);
                    out.push_str(statement);
                    out.push('\n');
                }
                out.push_str(&pad);
                out.push('}');
            }
        }

        let modifier_pad = indent(level + 1, INDENT);
        for modifier in &self.modifiers {
            out.push('\n');
            out.push_str(&modifier_pad);
            out.push_str(modifier);
        }
    }

    pub fn to_code(&self, level: usize) -> String {
        let mut out = String::new();
        self.write(&mut out, level);
        out
    }
}

/// SwiftUI code generator.
pub struct SwiftUiBackend<'a> {
    engine: TemplateEngine<'a>,
    scale: Scale,
    view_name: String,
    license: Option<String>,
}

impl<'a> SwiftUiBackend<'a> {
    pub fn new(options: &ExportOptions, doc: &Document) -> Result<Self> {
        let mut engine = TemplateEngine::new();
        engine.register_template("swiftui_view", VIEW_TEMPLATE)?;
        Ok(Self {
            engine,
            scale: options.scale_for(doc),
            view_name: format!("{}View", options.type_name()),
            license: options.license_text.clone(),
        })
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    /// Size and center position in the parent stack.
    fn place(&self, view: SwiftView, frame: Frame) -> SwiftView {
        let frame = self.scale.frame(frame);
        let center = frame.center();
        view.modifier(format!(
            ".frame(width: {}, height: {})",
            fixed1(frame.width),
            fixed1(frame.height)
        ))
        .modifier(format!(".position(x: {}, y: {})", fixed1(center.x), fixed1(center.y)))
    }

    fn finish(&self, mut view: SwiftView, meta: &NodeMeta) -> SwiftView {
        if let Some(opacity) = meta.opacity {
            view = view.modifier(format!(".opacity({})", short(opacity, 2)));
        }
        if meta.hidden {
            view = view.modifier(".hidden()");
        }
        view
    }

    fn font(&self, run: &TextRun) -> String {
        let mut font = format!(
            ".custom({}, size: {})",
            swift_string(&run.font_family),
            font_points(self.scale.font_size(run.size))
        );
        if run.bold {
            font.push_str(".weight(.bold)");
        }
        if run.italic {
            font.push_str(".italic()");
        }
        format!(".font({})", font)
    }

    /// `LinearGradient` or `RadialGradient` relative to the drawn frame.
    fn gradient(&self, gradient: &Gradient, frame: Frame) -> String {
        let stops = gradient
            .stops
            .iter()
            .map(|stop| {
                format!(
                    ".init(color: {}, location: {:.2})",
                    swift_color(&stop.color),
                    stop.offset.clamp(0.0, 1.0)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        match gradient.kind {
            GradientKind::Linear { start, end } => {
                let (from, to) = linear_unit_points(start, end, frame);
                format!(
                    "LinearGradient(stops: [{}], startPoint: {}, endPoint: {})",
                    stops, from, to
                )
            }
            GradientKind::Radial { center, radius } => format!(
                "RadialGradient(stops: [{}], center: {}, startRadius: 0.0, endRadius: {})",
                stops,
                unit_point(center, frame),
                fixed1(self.scale.length(radius))
            ),
        }
    }

    fn styled_text(&self, text: &str, run: &TextRun) -> SwiftView {
        SwiftView::leaf(format!("Text({})", swift_string(text)))
            .modifier(self.font(run))
            .modifier(format!(".foregroundStyle({})", swift_color(&run.color)))
    }

    /// Path statements relative to `origin`.
    fn path_statements(&self, node: &ShapeNode, origin: Point) -> Vec<String> {
        let local = |p: Point| {
            let p = self.scale.point(p - origin);
            format!("CGPoint(x: {}, y: {})", fixed1(p.x), fixed1(p.y))
        };
        node.commands
            .iter()
            .map(|cmd| match *cmd {
                PathCommand::Move(p) => format!("path.move(to: {})", local(p)),
                PathCommand::CubicCurve {
                    end,
                    control1,
                    control2,
                } => format!(
                    "path.addCurve(to: {}, control1: {}, control2: {})",
                    local(end),
                    local(control1),
                    local(control2)
                ),
                PathCommand::Close => "path.closeSubpath()".to_string(),
            })
            .collect()
    }
}

fn unit_point(p: Point, frame: Frame) -> String {
    let axis = |v: f64, origin: f64, len: f64| if len > 0.0 { (v - origin) / len } else { 0.5 };
    format!(
        "UnitPoint(x: {:.2}, y: {:.2})",
        axis(p.x, frame.x, frame.width),
        axis(p.y, frame.y, frame.height)
    )
}

/// Named unit points for axis-aligned gradients, explicit ones otherwise.
fn linear_unit_points(start: Point, end: Point, frame: Frame) -> (String, String) {
    let named = |a: &str, b: &str| (a.to_string(), b.to_string());
    if (start.y - end.y).abs() < 1e-6 && start.x != end.x {
        if start.x < end.x {
            named(".leading", ".trailing")
        } else {
            named(".trailing", ".leading")
        }
    } else if (start.x - end.x).abs() < 1e-6 && start.y != end.y {
        if start.y < end.y {
            named(".top", ".bottom")
        } else {
            named(".bottom", ".top")
        }
    } else {
        (unit_point(start, frame), unit_point(end, frame))
    }
}

fn text_alignment(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left | Alignment::Justify => ".leading",
        Alignment::Center => ".center",
        Alignment::Right => ".trailing",
    }
}

fn contents_json(value: serde_json::Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

fn catalog_info() -> serde_json::Value {
    json!({ "info": { "author": "xcode", "version": 1 } })
}

impl<'a> Backend for SwiftUiBackend<'a> {
    type Fragment = SwiftView;

    fn target(&self) -> Target {
        Target::SwiftUi
    }

    fn render_group(&self, node: &GroupNode, children: Vec<SwiftView>) -> Result<SwiftView> {
        Ok(self.finish(SwiftView::container("Group", children), &node.meta))
    }

    fn render_shape(&self, node: &ShapeNode) -> Result<SwiftView> {
        // Drawn over the stroke-inclusive frame; insettable shapes keep the
        // stroke inside it with `strokeBorder`.
        let frame = node.outer_frame();
        let (mut view, insettable) = match node.primitive() {
            ShapePrimitive::Rectangle(_) => (SwiftView::leaf("Rectangle()"), true),
            ShapePrimitive::RoundedRectangle { radius, .. } => {
                let radius = self.scale.length(radius + node.stroke_outset());
                (
                    SwiftView::leaf(format!("RoundedRectangle(cornerRadius: {})", fixed1(radius))),
                    true,
                )
            }
            ShapePrimitive::Path => (
                SwiftView::path(self.path_statements(node, frame.origin())),
                false,
            ),
        };

        if let Some(gradient) = &node.gradient {
            view = view.modifier(format!(".fill({})", self.gradient(gradient, frame)));
        } else if let Some(fill) = &node.fill {
            view = view.modifier(format!(".fill({})", swift_color(fill)));
        }
        if let Some(stroke) = &node.stroke {
            view = view.modifier(format!(
                ".{}({}, lineWidth: {})",
                if insettable { "strokeBorder" } else { "stroke" },
                swift_color(&stroke.color),
                fixed1(self.scale.length(stroke.width))
            ));
        }
        if node.fill.is_none() && node.gradient.is_none() && node.stroke.is_none() {
            view = view.modifier(".fill(Color.clear)");
        }

        let view = self.place(view, frame);
        Ok(self.finish(view, &node.meta))
    }

    fn render_text(&self, node: &TextNode) -> Result<SwiftView> {
        let mut view = if node.is_single_run() {
            let run = &node.runs[0];
            self.styled_text(&run.text, run)
                .modifier(format!(".multilineTextAlignment({})", text_alignment(node.alignment)))
        } else {
            let mut last_run = 0;
            let rows = node
                .rows
                .iter()
                .map(|row| {
                    let texts: Vec<SwiftView> = if row.slices.is_empty() {
                        node.runs
                            .get(last_run)
                            .map(|run| self.styled_text("", run))
                            .into_iter()
                            .collect()
                    } else {
                        row.slices
                            .iter()
                            .filter_map(|slice| {
                                last_run = slice.run;
                                node.runs.get(slice.run).map(|run| self.styled_text(&slice.text, run))
                            })
                            .collect()
                    };
                    SwiftView::container("HStack(alignment: .firstTextBaseline, spacing: 0)", texts)
                })
                .collect();
            SwiftView::container(
                format!("VStack(alignment: {}, spacing: 0)", text_alignment(node.alignment)),
                rows,
            )
        };

        if node.wrap == WrapMode::Point {
            view = view.modifier(".fixedSize()");
        }
        let view = self.place(view, node.meta.frame);
        Ok(self.finish(view, &node.meta))
    }

    fn render_image(&self, node: &ImageNode) -> Result<SwiftView> {
        let view = SwiftView::leaf(format!("Image({})", swift_string(node.asset.name.as_str())))
            .modifier(".resizable()")
            .modifier(".aspectRatio(contentMode: .fit)");
        let view = self.place(view, node.meta.frame);
        Ok(self.finish(view, &node.meta))
    }

    fn render_document(&self, doc: &Document, children: Vec<SwiftView>) -> Result<Vec<GeneratedFile>> {
        let mut body = String::new();
        for child in &children {
            child.write(&mut body, 3);
            body.push('\n');
        }

        let canvas = self.scale.frame(doc.root().meta.frame);
        let source = self.engine.render(
            "swiftui_view",
            &json!({
                "license": self.license,
                "name": self.view_name,
                "body": body,
                "width": fixed1(canvas.width),
                "height": fixed1(canvas.height),
            }),
        )?;

        Ok(vec![
            GeneratedFile::source(format!("Views/{}.swift", self.view_name), source),
            GeneratedFile::source(format!("{}/Contents.json", CATALOG), contents_json(catalog_info())?),
            GeneratedFile::source(
                format!("{}/Images/Contents.json", CATALOG),
                contents_json(catalog_info())?,
            ),
        ])
    }

    fn asset_files(&self, asset: &AssetRef) -> Result<Vec<GeneratedFile>> {
        let set_dir = format!("{}/Images/{}.imageset", CATALOG, asset.name);
        let manifest = json!({
            "images": [
                { "filename": asset.file_name, "idiom": "universal", "scale": "1x" },
                { "idiom": "universal", "scale": "2x" },
                { "idiom": "universal", "scale": "3x" }
            ],
            "info": { "author": "xcode", "version": 1 }
        });

        Ok(vec![
            GeneratedFile::asset(format!("{}/{}", set_dir, asset.file_name), asset_bytes(asset)?),
            GeneratedFile::source(format!("{}/Contents.json", set_dir), contents_json(manifest)?),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use strata_core::{Color, GradientStop, GroupNode, Identifier, RunRow, RunSlice, Stroke};

    fn meta(id: &str, frame: Frame) -> NodeMeta {
        NodeMeta {
            id: Identifier::from(id),
            name: id.to_string(),
            frame,
            opacity: None,
            hidden: false,
        }
    }

    fn backend() -> SwiftUiBackend<'static> {
        let root = GroupNode {
            meta: meta("root", Frame::new(0.0, 0.0, 320.0, 240.0)),
            children: vec![],
        };
        let doc = Document::new(320, 240, 72.0, root, vec![]);
        SwiftUiBackend::new(&ExportOptions::default(), &doc).unwrap()
    }

    fn line(from: Point, to: Point) -> PathCommand {
        PathCommand::CubicCurve {
            end: to,
            control1: from,
            control2: to,
        }
    }

    fn rectangle(frame: Frame) -> ShapeNode {
        let corners = [
            Point::new(frame.x, frame.y),
            Point::new(frame.right(), frame.y),
            Point::new(frame.right(), frame.bottom()),
            Point::new(frame.x, frame.bottom()),
        ];
        let mut commands = vec![PathCommand::Move(corners[0])];
        for i in 0..4 {
            commands.push(line(corners[i], corners[(i + 1) % 4]));
        }
        commands.push(PathCommand::Close);
        ShapeNode {
            meta: meta("background", frame),
            commands,
            fill: Some(Color::from_rgb8(93, 82, 6)),
            gradient: None,
            stroke: None,
            corner_radius: None,
        }
    }

    fn run(text: &str, size: f64) -> TextRun {
        TextRun {
            text: text.to_string(),
            font_family: "Arial".to_string(),
            size,
            color: Color::BLACK,
            bold: false,
            italic: false,
        }
    }

    #[test]
    fn test_rectangle_uses_center_position() {
        let view = backend()
            .render_shape(&rectangle(Frame::new(0.0, 0.0, 320.0, 240.0)))
            .unwrap();
        insta::assert_snapshot!(view.to_code(0), @r###"
        Rectangle()
            .fill(Color(red: 0.365, green: 0.322, blue: 0.024))
            .frame(width: 320.0, height: 240.0)
            .position(x: 160.0, y: 120.0)
        "###);
    }

    #[test]
    fn test_curved_shape_uses_local_path() {
        let mut shape = rectangle(Frame::new(10.0, 20.0, 30.0, 40.0));
        shape.commands = vec![
            PathCommand::Move(Point::new(10.0, 20.0)),
            PathCommand::CubicCurve {
                end: Point::new(40.0, 60.0),
                control1: Point::new(20.0, 20.0),
                control2: Point::new(40.0, 50.0),
            },
        ];
        shape.fill = None;
        shape.stroke = Some(Stroke {
            color: Color::WHITE,
            width: 2.0,
        });
        shape.meta.opacity = Some(0.37);

        let code = backend().render_shape(&shape).unwrap().to_code(0);
        assert!(code.starts_with("Path { path in\n"));
        assert!(code.contains("    path.move(to: CGPoint(x: 1.0, y: 1.0))\n"));
        assert!(code.contains(
            "path.addCurve(to: CGPoint(x: 31.0, y: 41.0), control1: CGPoint(x: 11.0, y: 1.0), control2: CGPoint(x: 31.0, y: 31.0))"
        ));
        assert!(code.contains(".frame(width: 32.0, height: 42.0)"));
        assert!(code.contains(".stroke(Color(red: 1.000, green: 1.000, blue: 1.000), lineWidth: 2.0)"));
        assert!(!code.contains(".fill("));
        assert!(code.ends_with(".opacity(0.37)"));
    }

    #[test]
    fn test_stroked_line_keeps_its_stroke() {
        let from = Point::new(20.0, 100.0);
        let to = Point::new(180.0, 100.0);
        let shape = ShapeNode {
            meta: meta("divider", Frame::new(20.0, 100.0, 160.0, 0.0)),
            commands: vec![PathCommand::Move(from), line(from, to)],
            fill: None,
            gradient: None,
            stroke: Some(Stroke {
                color: Color::BLACK,
                width: 8.0,
            }),
            corner_radius: None,
        };
        let code = backend().render_shape(&shape).unwrap().to_code(0);
        assert!(code.contains("path.move(to: CGPoint(x: 4.0, y: 4.0))"));
        assert!(code.contains("path.addCurve(to: CGPoint(x: 164.0, y: 4.0)"));
        assert!(code.contains(".stroke(Color(red: 0.000, green: 0.000, blue: 0.000), lineWidth: 8.0)"));
        assert!(code.contains(".frame(width: 168.0, height: 8.0)\n    .position(x: 100.0, y: 100.0)"));
    }

    #[test]
    fn test_rounded_rectangle_borders_inside_outer_frame() {
        let mut shape = rectangle(Frame::new(10.0, 10.0, 100.0, 50.0));
        shape.corner_radius = Some(12.0);
        shape.stroke = Some(Stroke {
            color: Color::WHITE,
            width: 4.0,
        });
        let view = backend().render_shape(&shape).unwrap();
        insta::assert_snapshot!(view.to_code(0), @r###"
        RoundedRectangle(cornerRadius: 14.0)
            .fill(Color(red: 0.365, green: 0.322, blue: 0.024))
            .strokeBorder(Color(red: 1.000, green: 1.000, blue: 1.000), lineWidth: 4.0)
            .frame(width: 104.0, height: 54.0)
            .position(x: 60.0, y: 35.0)
        "###);
    }

    #[test]
    fn test_gradient_fill_takes_precedence() {
        let mut shape = rectangle(Frame::new(0.0, 0.0, 200.0, 100.0));
        shape.gradient = Some(Gradient {
            kind: GradientKind::Linear {
                start: Point::new(0.0, 50.0),
                end: Point::new(200.0, 50.0),
            },
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: Color::WHITE,
                },
                GradientStop {
                    offset: 1.0,
                    color: Color::BLACK,
                },
            ],
        });
        let code = backend().render_shape(&shape).unwrap().to_code(0);
        assert!(code.contains(
            ".fill(LinearGradient(stops: [.init(color: Color(red: 1.000, green: 1.000, blue: 1.000), location: 0.00), .init(color: Color(red: 0.000, green: 0.000, blue: 0.000), location: 1.00)], startPoint: .leading, endPoint: .trailing))"
        ));
        assert_eq!(code.matches(".fill(").count(), 1);

        shape.gradient = Some(Gradient {
            kind: GradientKind::Radial {
                center: Point::new(50.0, 25.0),
                radius: 40.0,
            },
            stops: vec![GradientStop {
                offset: 0.0,
                color: Color::WHITE,
            }],
        });
        let code = backend().render_shape(&shape).unwrap().to_code(0);
        assert!(code.contains("center: UnitPoint(x: 0.25, y: 0.25), startRadius: 0.0, endRadius: 40.0))"));
    }

    #[test]
    fn test_bold_italic_font() {
        let mut styled = run("Hi", 16.0);
        styled.bold = true;
        styled.italic = true;
        let view = backend().styled_text("Hi", &styled);
        assert!(view
            .to_code(0)
            .contains(".font(.custom(\"Arial\", size: 16).weight(.bold).italic())"));
    }

    #[test]
    fn test_single_run_is_one_text() {
        let node = TextNode {
            meta: meta("title", Frame::from_center(Point::new(130.0, 101.5), strata_core::Size::new(160.0, 43.0))),
            runs: vec![run("Example1", 30.0)],
            rows: vec![RunRow {
                slices: smallvec![RunSlice {
                    run: 0,
                    text: "Example1".to_string()
                }],
            }],
            wrap: WrapMode::Paragraph,
            alignment: Alignment::Center,
        };
        let code = backend().render_text(&node).unwrap().to_code(0);
        insta::assert_snapshot!(code, @r###"
        Text("Example1")
            .font(.custom("Arial", size: 30))
            .foregroundStyle(Color(red: 0.000, green: 0.000, blue: 0.000))
            .multilineTextAlignment(.center)
            .frame(width: 160.0, height: 43.0)
            .position(x: 130.0, y: 101.5)
        "###);
    }

    #[test]
    fn test_multiple_runs_share_a_row() {
        let node = TextNode {
            meta: meta("mixed", Frame::new(0.0, 0.0, 100.0, 30.0)),
            runs: vec![run("Big", 24.0), run("small", 12.0)],
            rows: vec![RunRow {
                slices: smallvec![
                    RunSlice {
                        run: 0,
                        text: "Big".to_string()
                    },
                    RunSlice {
                        run: 1,
                        text: "small".to_string()
                    }
                ],
            }],
            wrap: WrapMode::Point,
            alignment: Alignment::Left,
        };
        let code = backend().render_text(&node).unwrap().to_code(0);
        assert!(code.starts_with(
            "VStack(alignment: .leading, spacing: 0) {\n    HStack(alignment: .firstTextBaseline, spacing: 0) {\n        Text(\"Big\")"
        ));
        assert_eq!(code.matches("HStack").count(), 1);
        assert!(code.contains("        Text(\"small\")\n            .font(.custom(\"Arial\", size: 12))"));
        assert!(code.contains("\n    .fixedSize()\n    .frame(width: 100.0, height: 30.0)"));
    }

    #[test]
    fn test_hidden_group() {
        let mut group_meta = meta("cards", Frame::ZERO);
        group_meta.hidden = true;
        let group = GroupNode {
            meta: group_meta,
            children: vec![],
        };
        let child = SwiftView::leaf("Rectangle()");
        let code = backend()
            .render_group(&group, vec![child])
            .unwrap()
            .to_code(0);
        assert_eq!(code, "Group {\n    Rectangle()\n}\n    .hidden()");
    }
}
