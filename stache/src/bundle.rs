//! Client bundle of stringified templates

use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::mustache::{self, NoPartials, Template};
use crate::reader::compile_template_file;
use crate::scanner::RawTemplate;

/// Wrapper template used when no `shared_templates_template` is configured
pub const DEFAULT_SHARED_TEMPLATES: &str = include_str!("../views/sharedTemplates.mustache");

/// One entry of the `templates` list handed to the wrapper template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringifiedTemplate {
    /// Logical template name
    pub id: String,
    /// Render function source
    pub script: String,
    /// Set on the final entry only, for separator control in the wrapper
    pub last: bool,
}

/// Compile the wrapper template at `path`, or the built-in one
pub fn load_wrapper(path: Option<&Path>) -> Result<Template> {
    match path {
        Some(path) => compile_template_file(path),
        None => mustache::compile(DEFAULT_SHARED_TEMPLATES).map_err(Error::from),
    }
}

/// Stringify every raw template, flagging the final one as `last`.
pub fn stringify_templates(raw_templates: &[RawTemplate]) -> Result<Vec<StringifiedTemplate>> {
    let count = raw_templates.len();
    raw_templates
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let script = mustache::compile_to_script(&raw.contents)
                .map_err(|e| Error::syntax_in(&raw.path, e))?;
            Ok(StringifiedTemplate {
                id: raw.id.clone(),
                script,
                last: i + 1 == count,
            })
        })
        .collect()
}

/// Render the client bundle: the wrapper template fed `{templates: [...]}`.
pub fn render_bundle(wrapper: &Template, raw_templates: &[RawTemplate]) -> Result<String> {
    let templates = stringify_templates(raw_templates)?;
    Ok(wrapper.render(&json!({ "templates": templates }), &NoPartials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn raw(id: &str, contents: &str) -> RawTemplate {
        RawTemplate {
            id: id.to_string(),
            contents: contents.to_string(),
            path: PathBuf::from(format!("{id}.mustache")),
        }
    }

    #[test]
    fn test_only_final_entry_is_last() {
        let entries = stringify_templates(&[raw("a", "A"), raw("b", "B"), raw("c", "C")]).unwrap();
        let flags: Vec<bool> = entries.iter().map(|e| e.last).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert!(entries[0].script.starts_with("function(c,p,i){"));
    }

    #[test]
    fn test_render_bundle_with_custom_wrapper() {
        let wrapper =
            mustache::compile("{{#templates}}{{id}}{{#last}}.{{/last}}{{^last}},{{/last}}{{/templates}}")
                .unwrap();
        let bundle = render_bundle(&wrapper, &[raw("header", "H"), raw("footer", "F")]).unwrap();
        assert_eq!(bundle, "header,footer.");
    }

    #[test]
    fn test_default_wrapper_emits_one_fragment_per_template() {
        let wrapper = mustache::compile(DEFAULT_SHARED_TEMPLATES).unwrap();
        let bundle = render_bundle(&wrapper, &[raw("header", "Hello {{name}}!"), raw("footer", "Bye")])
            .unwrap();

        assert_eq!(bundle.matches("new Hogan.Template(function(c,p,i){").count(), 2);
        assert!(bundle.contains("\"header\": new Hogan.Template("));
        assert!(bundle.contains("_.b(_.v(_.f(\"name\",c,p,0)));"));
        assert!(bundle.contains("return _.fl();;}),\n"));
        assert!(bundle.contains("return _.fl();;})\n  };"));
    }

    #[test]
    fn test_render_bundle_of_nothing() {
        let wrapper = mustache::compile(DEFAULT_SHARED_TEMPLATES).unwrap();
        let bundle = render_bundle(&wrapper, &[]).unwrap();
        assert!(bundle.contains("var templates = {\n  };"));
    }
}
