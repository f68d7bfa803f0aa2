//! Compiled template registry keyed by logical name

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::mustache::{self, PartialLookup, Template};
use crate::scanner::{template_id, RawTemplate};

/// Mapping from logical template name to compiled template.
///
/// A registry is built in one go from a directory scan and never updated
/// in place; a reload builds a fresh one. Entries are shared through
/// [`Arc`], so a template fetched before a reload stays usable afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    templates: HashMap<String, Arc<Template>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every raw template, later ids overwriting earlier ones.
    pub fn build(raw_templates: &[RawTemplate]) -> Result<Self> {
        let mut templates = HashMap::with_capacity(raw_templates.len());
        for raw in raw_templates {
            let template =
                mustache::compile(&raw.contents).map_err(|e| Error::syntax_in(&raw.path, e))?;
            if templates
                .insert(raw.id.clone(), Arc::new(template))
                .is_some()
            {
                tracing::debug!(id = %raw.id, path = %raw.path.display(), "template id redefined");
            }
        }
        Ok(Self { templates })
    }

    /// Look up a template by bare id or by a path-like name.
    ///
    /// `"sub/dir/header.mustache"` and `"header"` resolve to the same entry.
    pub fn get(&self, name: &str) -> Option<&Arc<Template>> {
        self.templates.get(template_id(name))
    }

    /// Check whether `name` resolves to a template
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Render `name` with this registry supplying the partials.
    ///
    /// Returns `None` for unknown names. Missing `locals` render as `{}`.
    pub fn render(&self, name: &str, locals: Option<&Value>) -> Option<String> {
        self.render_with(name, locals, self)
    }

    /// Render `name` with an explicit partial source.
    pub fn render_with<P>(&self, name: &str, locals: Option<&Value>, partials: &P) -> Option<String>
    where
        P: PartialLookup + ?Sized,
    {
        let template = self.get(name)?;
        let empty = Value::Object(Default::default());
        Some(template.render(locals.unwrap_or(&empty), partials))
    }

    /// All ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry holds no templates
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl PartialLookup for Registry {
    fn partial(&self, name: &str) -> Option<&Template> {
        self.templates.get(name).map(Arc::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn raw(id: &str, contents: &str) -> RawTemplate {
        RawTemplate {
            id: id.to_string(),
            contents: contents.to_string(),
            path: PathBuf::from(format!("{id}.mustache")),
        }
    }

    #[test]
    fn test_build_one_entry_per_id() {
        let registry = Registry::build(&[raw("a", "A"), raw("b", "B")]).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_later_templates_overwrite_earlier_ones() {
        let registry = Registry::build(&[raw("foo", "first"), raw("foo", "second")]).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.render("foo", None).as_deref(), Some("second"));
    }

    #[test]
    fn test_path_like_and_bare_names_share_a_reference() {
        let registry = Registry::build(&[raw("name", "x")]).unwrap();
        let by_path = registry.get("sub/dir/name.ext").unwrap();
        let by_id = registry.get("name").unwrap();
        assert!(Arc::ptr_eq(by_path, by_id));
        assert!(registry.contains("sub/dir/name.ext"));
    }

    #[test]
    fn test_render_unknown_name_is_none() {
        let registry = Registry::build(&[raw("a", "A")]).unwrap();
        assert!(registry.get("missing").is_none());
        assert!(registry.render("missing", None).is_none());
        assert!(registry.contains("a"));
        assert!(!registry.contains("missing"));
    }

    #[test]
    fn test_render_uses_registry_as_partials() {
        let registry = Registry::build(&[
            raw("page", "<main>{{> header}}</main>"),
            raw("header", "<h1>{{title}}</h1>"),
        ])
        .unwrap();
        let html = registry.render("page", Some(&json!({ "title": "Hi" })));
        assert_eq!(html.as_deref(), Some("<main><h1>Hi</h1></main>"));
    }

    #[test]
    fn test_render_with_external_partials() {
        let layouts = Registry::build(&[raw("main", "[{{> nav}}]")]).unwrap();
        let partials = Registry::build(&[raw("nav", "menu")]).unwrap();
        assert_eq!(
            layouts.render_with("main", None, &partials).as_deref(),
            Some("[menu]")
        );
    }

    #[test]
    fn test_build_reports_file_of_syntax_error() {
        let err = Registry::build(&[raw("broken", "{{#open}}")]).unwrap_err();
        assert!(err.to_string().contains("broken.mustache"));
    }
}
