//! Template engine for generated source files.

use crate::error::{CodegenError, Result};
use handlebars::Handlebars;
use serde::Serialize;

/// Template engine using Handlebars.
///
/// Output is source code, so HTML escaping is disabled.
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Create a new template engine.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        Self::register_helpers(&mut handlebars);

        Self { handlebars }
    }

    /// Register a template.
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(CodegenError::InvalidTemplate)?;
        Ok(())
    }

    /// Render a registered template.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .map_err(CodegenError::TemplateError)
    }

    fn register_helpers(handlebars: &mut Handlebars) {
        // Line comment block, followed by a blank line; nothing for null.
        handlebars.register_helper(
            "line_comment",
            Box::new(
                |h: &handlebars::Helper,
                 _r: &Handlebars,
                 _ctx: &handlebars::Context,
                 _rc: &mut handlebars::RenderContext,
                 out: &mut dyn handlebars::Output| {
                    if let Some(text) = h.param(0).and_then(|v| v.value().as_str()) {
                        out.write(&line_comment(text))?;
                    }
                    Ok(())
                },
            ),
        );
    }
}

impl<'a> Default for TemplateEngine<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    use convert_case::{Case, Casing};
    s.to_case(Case::Pascal)
}

fn line_comment(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        if line.is_empty() {
            out.push_str("//\n");
        } else {
            out.push_str("// ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_helpers() {
        let mut engine = TemplateEngine::new();
        engine
            .register_template("t", "{{line_comment license}}struct {{name}} <{{body}}>")
            .unwrap();

        let out = engine
            .render("t", &json!({"license": "MIT\n\nCopyright", "name": "MainView", "body": "a < b"}))
            .unwrap();
        assert_eq!(out, "// MIT\n//\n// Copyright\n\nstruct MainView <a < b>");

        let out = engine
            .render("t", &json!({"license": null, "name": "X", "body": ""}))
            .unwrap();
        assert_eq!(out, "struct X <>");
    }
}
