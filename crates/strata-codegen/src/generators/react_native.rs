//! React Native backend.
//!
//! Elements are absolutely positioned by their top-left corner through a
//! `StyleSheet` table. Vector paths go through `react-native-svg`.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::json;
use strata_core::{
    Alignment, AssetRef, Document, Frame, GroupNode, ImageNode, NodeMeta, PathCommand, Point,
    ShapeNode, ShapePrimitive, TextNode, TextRun,
};
use strata_model::naming::{NameKind, NameRegistry};

use super::common::{asset_bytes, css_color, font_points, indent, js_string, jsx_text, short};
use super::templates::TemplateEngine;
use super::{Backend, GeneratedFile, Target};
use crate::error::Result;
use crate::options::{ExportOptions, Scale};

const INDENT: usize = 2;
const ASSET_DIR: &str = "assets/images";
const ROOT_STYLE: &str = "root";
const RUN_ROW_STYLE: &str = "runRow";

const SCREEN_TEMPLATE: &str = r#"{{line_comment license}}import React from 'react';
import { {{imports}} } from 'react-native';
{{svg_import}}
const {{name}}: React.FC = () => {
  return (
{{body}}  );
};

const styles = StyleSheet.create({
{{styles}}});

export default {{name}};
"#;

type StyleProps = Vec<(&'static str, String)>;

/// A style entry before it has been given a key in the style table.
#[derive(Debug, Clone, PartialEq)]
struct RnStyle {
    hint: String,
    props: StyleProps,
    /// Shared styles get one table entry per hint.
    shared: bool,
}

/// A JSX element.
#[derive(Debug, Clone, PartialEq)]
pub struct RnElement {
    tag: &'static str,
    style: Option<RnStyle>,
    props: Vec<(&'static str, String)>,
    children: Vec<RnElement>,
    text: Option<String>,
}

impl RnElement {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            style: None,
            props: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    fn styled(mut self, hint: impl Into<String>, props: StyleProps) -> Self {
        self.style = Some(RnStyle {
            hint: hint.into(),
            props,
            shared: false,
        });
        self
    }

    fn shared_style(mut self, hint: impl Into<String>, props: StyleProps) -> Self {
        self.style = Some(RnStyle {
            hint: hint.into(),
            props,
            shared: true,
        });
        self
    }

    fn prop(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.props.push((name, value.into()));
        self
    }

    fn child(mut self, child: RnElement) -> Self {
        self.children.push(child);
        self
    }

    fn text(mut self, text: &str) -> Self {
        self.text = Some(jsx_text(text));
        self
    }

    fn visit(&self, f: &mut impl FnMut(&RnElement)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Write the element and its children, assigning style keys on the way.
    fn write(&self, out: &mut String, level: usize, table: &mut StyleTable) -> Result<()> {
        let pad = indent(level, INDENT);
        out.push_str(&pad);
        out.push('<');
        out.push_str(self.tag);
        if let Some(style) = &self.style {
            let key = table.key_for(style)?;
            out.push_str(&format!(" style={{styles.{}}}", key));
        }
        for (name, value) in &self.props {
            out.push_str(&format!(" {}={}", name, value));
        }

        match (&self.text, self.children.is_empty()) {
            (None, true) => out.push_str(" />\n"),
            (Some(text), true) => {
                out.push('>');
                out.push_str(text);
                out.push_str(&format!("</{}>\n", self.tag));
            }
            (_, false) => {
                out.push_str(">\n");
                for child in &self.children {
                    child.write(out, level + 1, table)?;
                }
                out.push_str(&pad);
                out.push_str(&format!("</{}>\n", self.tag));
            }
        }
        Ok(())
    }
}

/// Style entries keyed by unique identifiers, in first-use order.
struct StyleTable {
    names: NameRegistry,
    entries: IndexMap<String, StyleProps>,
    shared: HashMap<String, String>,
}

impl StyleTable {
    fn new() -> Self {
        let mut names = NameRegistry::empty();
        names.reserve(ROOT_STYLE);
        Self {
            names,
            entries: IndexMap::new(),
            shared: HashMap::new(),
        }
    }

    fn key_for(&mut self, style: &RnStyle) -> Result<String> {
        if style.shared {
            if let Some(key) = self.shared.get(&style.hint) {
                return Ok(key.clone());
            }
        }
        let key = if style.hint == ROOT_STYLE && !self.entries.contains_key(ROOT_STYLE) {
            ROOT_STYLE.to_string()
        } else {
            self.names.issue(&style.hint, NameKind::Shape)?.0
        };
        self.entries.insert(key.clone(), style.props.clone());
        if style.shared {
            self.shared.insert(style.hint.clone(), key.clone());
        }
        Ok(key)
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for (key, props) in &self.entries {
            out.push_str(&format!("  {}: {{\n", key));
            for (name, value) in props {
                out.push_str(&format!("    {}: {},\n", name, value));
            }
            out.push_str("  },\n");
        }
        out
    }
}

/// React Native code generator.
pub struct ReactNativeBackend<'a> {
    engine: TemplateEngine<'a>,
    scale: Scale,
    /// Canvas in document coordinates.
    canvas: Frame,
    screen_name: String,
    license: Option<String>,
}

impl<'a> ReactNativeBackend<'a> {
    pub fn new(options: &ExportOptions, doc: &Document) -> Result<Self> {
        let mut engine = TemplateEngine::new();
        engine.register_template("react_native_screen", SCREEN_TEMPLATE)?;
        Ok(Self {
            engine,
            scale: options.scale_for(doc),
            canvas: doc.root().meta.frame,
            screen_name: format!("{}Screen", options.type_name()),
            license: options.license_text.clone(),
        })
    }

    pub fn screen_name(&self) -> &str {
        &self.screen_name
    }

    /// Top-left anchored absolute placement.
    fn absolute(&self, frame: Frame) -> StyleProps {
        let frame = self.scale.frame(frame);
        vec![
            ("position", "'absolute'".to_string()),
            ("left", short(frame.x, 1)),
            ("top", short(frame.y, 1)),
            ("width", short(frame.width, 1)),
            ("height", short(frame.height, 1)),
        ]
    }

    fn finish(&self, props: &mut StyleProps, meta: &NodeMeta) {
        if let Some(opacity) = meta.opacity {
            props.push(("opacity", short(opacity, 2)));
        }
        if meta.hidden {
            props.push(("display", "'none'".to_string()));
        }
    }

    fn font(&self, run: &TextRun) -> StyleProps {
        let mut props = vec![
            ("fontFamily", js_string(&run.font_family)),
            ("fontSize", font_points(self.scale.font_size(run.size)).to_string()),
            ("color", js_string(&css_color(&run.color))),
        ];
        if run.bold {
            props.push(("fontWeight", "'bold'".to_string()));
        }
        if run.italic {
            props.push(("fontStyle", "'italic'".to_string()));
        }
        props
    }

    /// Path data relative to `origin`.
    fn path_data(&self, node: &ShapeNode, origin: Point) -> String {
        let local = |p: Point| {
            let p = self.scale.point(p - origin);
            format!("{} {}", short(p.x, 1), short(p.y, 1))
        };
        node.commands
            .iter()
            .map(|cmd| match *cmd {
                PathCommand::Move(p) => format!("M {}", local(p)),
                PathCommand::CubicCurve {
                    end,
                    control1,
                    control2,
                } => format!("C {} {} {}", local(control1), local(control2), local(end)),
                PathCommand::Close => "Z".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Cross-axis alignment of the rows in a multi-run block.
fn align_items(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left | Alignment::Justify => "'flex-start'",
        Alignment::Center => "'center'",
        Alignment::Right => "'flex-end'",
    }
}

fn text_align(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "'left'",
        Alignment::Center => "'center'",
        Alignment::Right => "'right'",
        Alignment::Justify => "'justify'",
    }
}

impl<'a> Backend for ReactNativeBackend<'a> {
    type Fragment = RnElement;

    fn target(&self) -> Target {
        Target::ReactNative
    }

    fn render_group(&self, node: &GroupNode, children: Vec<RnElement>) -> Result<RnElement> {
        // Full-canvas container so children keep canvas coordinates.
        let mut style = self.absolute(self.canvas);
        self.finish(&mut style, &node.meta);
        let mut element = RnElement::new("View").styled(node.meta.id.as_str(), style);
        element.children = children;
        Ok(element)
    }

    fn render_shape(&self, node: &ShapeNode) -> Result<RnElement> {
        // Borders are drawn inside the box, so the box covers the stroke.
        let frame = node.outer_frame();
        let mut style = self.absolute(frame);
        // No gradient support; the first stop stands in for the fill.
        let fill = node
            .gradient
            .as_ref()
            .and_then(|gradient| gradient.first_color())
            .or(node.fill);

        let primitive = node.primitive();
        let boxed = matches!(
            primitive,
            ShapePrimitive::Rectangle(_) | ShapePrimitive::RoundedRectangle { .. }
        );
        let element = if boxed {
            if let Some(fill) = &fill {
                style.push(("backgroundColor", js_string(&css_color(fill))));
            }
            if let ShapePrimitive::RoundedRectangle { radius, .. } = primitive {
                let radius = self.scale.length(radius + node.stroke_outset());
                style.push(("borderRadius", short(radius, 1)));
            }
            if let Some(stroke) = &node.stroke {
                style.push(("borderWidth", short(self.scale.length(stroke.width), 1)));
                style.push(("borderColor", js_string(&css_color(&stroke.color))));
            }
            self.finish(&mut style, &node.meta);
            RnElement::new("View").styled(node.meta.id.as_str(), style)
        } else {
            let size = self.scale.frame(frame);
            let (w, h) = (short(size.width, 1), short(size.height, 1));
            let mut path = RnElement::new("Path")
                .prop("d", format!("\"{}\"", self.path_data(node, frame.origin())))
                .prop(
                    "fill",
                    format!("\"{}\"", fill.as_ref().map_or("none".to_string(), css_color)),
                );
            if let Some(stroke) = &node.stroke {
                path = path
                    .prop("stroke", format!("\"{}\"", css_color(&stroke.color)))
                    .prop("strokeWidth", format!("{{{}}}", short(self.scale.length(stroke.width), 1)));
            }
            self.finish(&mut style, &node.meta);
            RnElement::new("Svg")
                .styled(node.meta.id.as_str(), style)
                .prop("width", format!("{{{}}}", w))
                .prop("height", format!("{{{}}}", h))
                .prop("viewBox", format!("\"0 0 {} {}\"", w, h))
                .child(path)
        };
        Ok(element)
    }

    fn render_text(&self, node: &TextNode) -> Result<RnElement> {
        let id = node.meta.id.as_str();
        let mut style = self.absolute(node.meta.frame);

        if node.is_single_run() {
            let run = &node.runs[0];
            style.extend(self.font(run));
            style.push(("textAlign", text_align(node.alignment).to_string()));
            self.finish(&mut style, &node.meta);
            return Ok(RnElement::new("Text").styled(id, style).text(&run.text));
        }

        style.push(("alignItems", align_items(node.alignment).to_string()));
        self.finish(&mut style, &node.meta);
        let run_text = |index: usize, text: &str| {
            node.runs.get(index).map(|run| {
                RnElement::new("Text")
                    .shared_style(format!("{}Run{}", id, index), self.font(run))
                    .text(text)
            })
        };
        let row_style = || {
            vec![
                ("flexDirection", "'row'".to_string()),
                ("alignItems", "'baseline'".to_string()),
            ]
        };

        let mut container = RnElement::new("View").styled(id, style);
        let mut last_run = 0;
        for row in &node.rows {
            let mut line = RnElement::new("View").shared_style(RUN_ROW_STYLE, row_style());
            if row.slices.is_empty() {
                line.children.extend(run_text(last_run, ""));
            }
            for slice in &row.slices {
                last_run = slice.run;
                line.children.extend(run_text(slice.run, &slice.text));
            }
            container.children.push(line);
        }
        Ok(container)
    }

    fn render_image(&self, node: &ImageNode) -> Result<RnElement> {
        let mut style = self.absolute(node.meta.frame);
        self.finish(&mut style, &node.meta);
        let source = format!("../{}/{}", ASSET_DIR, node.asset.file_name);
        Ok(RnElement::new("Image")
            .styled(node.meta.id.as_str(), style)
            .prop("source", format!("{{require({})}}", js_string(&source)))
            .prop("resizeMode", "\"contain\""))
    }

    fn render_document(&self, _doc: &Document, children: Vec<RnElement>) -> Result<Vec<GeneratedFile>> {
        let canvas = self.scale.frame(self.canvas);
        let mut root = RnElement::new("View").styled(
            ROOT_STYLE,
            vec![
                ("width", short(canvas.width, 1)),
                ("height", short(canvas.height, 1)),
            ],
        );
        root.children = children;

        let (mut has_text, mut has_image, mut has_svg) = (false, false, false);
        root.visit(&mut |el| match el.tag {
            "Text" => has_text = true,
            "Image" => has_image = true,
            "Svg" => has_svg = true,
            _ => {}
        });
        let mut imports = vec!["View", "StyleSheet"];
        if has_text {
            imports.push("Text");
        }
        if has_image {
            imports.push("Image");
        }

        let mut table = StyleTable::new();
        let mut body = String::new();
        root.write(&mut body, 2, &mut table)?;

        let source = self.engine.render(
            "react_native_screen",
            &json!({
                "license": self.license,
                "imports": imports.join(", "),
                "svg_import": if has_svg { "import Svg, { Path } from 'react-native-svg';\n" } else { "" },
                "name": self.screen_name,
                "body": body,
                "styles": table.render(),
            }),
        )?;

        Ok(vec![GeneratedFile::source(
            format!("components/{}.tsx", self.screen_name),
            source,
        )])
    }

    fn asset_files(&self, asset: &AssetRef) -> Result<Vec<GeneratedFile>> {
        Ok(vec![GeneratedFile::asset(
            format!("{}/{}", ASSET_DIR, asset.file_name),
            asset_bytes(asset)?,
        )])
    }
}
