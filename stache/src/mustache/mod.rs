//! Mustache template engine.
//!
//! Compiles Mustache source text into a [`Template`] that can either be
//! rendered on the server against JSON data, or stringified into a
//! client-side render function for the Hogan.js runtime.
//!
//! # Supported syntax
//!
//! - `{{name}}` escaped interpolation, `{{{name}}}` / `{{& name}}` raw
//! - `{{a.b.c}}` dotted names and `{{.}}` implicit iterator
//! - `{{#name}}...{{/name}}` sections, `{{^name}}...{{/name}}` inverted sections
//! - `{{> partial}}` partials, with standalone-line indentation
//! - `{{! comment }}` and `{{=<% %>=}}` delimiter changes
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use stache::mustache::{self, NoPartials};
//!
//! let template = mustache::compile("Hello {{name}}!").unwrap();
//! let output = template.render(&json!({ "name": "World" }), &NoPartials);
//! assert_eq!(output, "Hello World!");
//! ```

mod codegen;
mod parser;
mod render;

use std::fmt;

pub use render::{NoPartials, PartialLookup};

use parser::Node;

/// Error produced when template text is not valid Mustache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line on which the problem was detected
    pub line: usize,
    /// Human-readable description
    pub message: String,
}

impl SyntaxError {
    /// Create a syntax error at `line`
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// A compiled Mustache template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Render against `data`, resolving `{{> name}}` through `partials`.
    ///
    /// Missing names and missing partials render as empty text.
    pub fn render<P>(&self, data: &serde_json::Value, partials: &P) -> String
    where
        P: PartialLookup + ?Sized,
    {
        render::render(&self.nodes, data, partials)
    }

    /// Emit this template as the source of a client-side render function.
    pub fn to_script(&self) -> String {
        codegen::generate(&self.nodes)
    }
}

/// Compile template text into a renderable [`Template`].
pub fn compile(text: &str) -> Result<Template, SyntaxError> {
    let nodes = parser::parse(text)?;
    Ok(Template { nodes })
}

/// Compile template text straight into client-side function source.
pub fn compile_to_script(text: &str) -> Result<String, SyntaxError> {
    compile(text).map(|template| template.to_script())
}

/// HTML-escape interpolated text
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_template_without_tags_renders_verbatim() {
        let text = "<p>\n  static text\n</p>\n";
        let template = compile(text).unwrap();
        assert_eq!(template.render(&json!({}), &NoPartials), text);
    }

    #[test]
    fn test_compile_reports_line_of_error() {
        let err = compile("one\ntwo\n{{#open}}three").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("open"));
    }

    #[test]
    fn test_compile_to_script_matches_to_script() {
        let text = "Hi {{name}}";
        assert_eq!(
            compile_to_script(text).unwrap(),
            compile(text).unwrap().to_script()
        );
    }
}
