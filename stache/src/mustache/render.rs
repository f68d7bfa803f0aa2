//! Server-side rendering of compiled templates

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::{escape_html, Node, Template};

/// Partials nested deeper than this render as empty text
const MAX_PARTIAL_DEPTH: usize = 64;

/// Source of templates for `{{> name}}` tags
pub trait PartialLookup {
    /// Find the partial registered under `name`
    fn partial(&self, name: &str) -> Option<&Template>;
}

/// Partial lookup that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPartials;

impl PartialLookup for NoPartials {
    fn partial(&self, _name: &str) -> Option<&Template> {
        None
    }
}

impl PartialLookup for HashMap<String, Template> {
    fn partial(&self, name: &str) -> Option<&Template> {
        self.get(name)
    }
}

impl PartialLookup for HashMap<String, Arc<Template>> {
    fn partial(&self, name: &str) -> Option<&Template> {
        self.get(name).map(Arc::as_ref)
    }
}

pub(super) fn render<P>(nodes: &[Node], data: &Value, partials: &P) -> String
where
    P: PartialLookup + ?Sized,
{
    let mut renderer = Renderer {
        partials,
        out: String::new(),
        depth: 0,
    };
    let mut stack = vec![data];
    renderer.walk(nodes, &mut stack, "");
    renderer.out
}

struct Renderer<'p, P: ?Sized> {
    partials: &'p P,
    out: String,
    depth: usize,
}

impl<'p, P> Renderer<'p, P>
where
    P: PartialLookup + ?Sized,
{
    fn walk<'d>(&mut self, nodes: &[Node], stack: &mut Vec<&'d Value>, indent: &str) {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),
                Node::Newline { last } => {
                    self.out.push('\n');
                    if !last {
                        self.out.push_str(indent);
                    }
                }
                Node::Variable { name, escape } => {
                    let text = lookup(name, stack).map(stringify).unwrap_or_default();
                    if *escape {
                        self.out.push_str(&escape_html(&text));
                    } else {
                        self.out.push_str(&text);
                    }
                }
                Node::Section {
                    name,
                    inverted: true,
                    nodes,
                    ..
                } => {
                    if !lookup(name, stack).is_some_and(is_truthy) {
                        self.walk(nodes, stack, indent);
                    }
                }
                Node::Section { name, nodes, .. } => match lookup(name, stack) {
                    Some(Value::Array(items)) => {
                        for item in items {
                            stack.push(item);
                            self.walk(nodes, stack, indent);
                            stack.pop();
                        }
                    }
                    Some(value) if value.is_object() => {
                        stack.push(value);
                        self.walk(nodes, stack, indent);
                        stack.pop();
                    }
                    Some(value) if is_truthy(value) => self.walk(nodes, stack, indent),
                    _ => {}
                },
                Node::Partial {
                    name,
                    indent: partial_indent,
                } => self.partial(name, partial_indent, stack),
            }
        }
    }

    fn partial<'d>(&mut self, name: &str, indent: &str, stack: &mut Vec<&'d Value>) {
        if self.depth >= MAX_PARTIAL_DEPTH {
            tracing::warn!(partial = name, "partial nesting limit reached");
            return;
        }
        let partials = self.partials;
        let Some(template) = partials.partial(name) else {
            return;
        };
        self.depth += 1;
        self.out.push_str(indent);
        self.walk(&template.nodes, stack, indent);
        self.depth -= 1;
    }
}

/// Resolve `name` against the context stack, innermost first.
fn lookup<'d>(name: &str, stack: &[&'d Value]) -> Option<&'d Value> {
    if name == "." {
        return stack.last().copied();
    }

    let mut segments = name.split('.');
    let first = segments.next()?;
    let mut value = stack
        .iter()
        .rev()
        .find_map(|frame| frame.as_object().and_then(|map| map.get(first)))?;

    for segment in segments {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Interpolated text of a value; whole-valued floats print without a
/// fraction (`2.0` as `2`), matching the client runtime.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
