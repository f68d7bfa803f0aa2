//! Owned template state: partials, layouts and the client bundle

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::bundle;
use crate::config::Config;
use crate::error::Result;
use crate::mustache::Template;
use crate::reader;
use crate::registry::Registry;
use crate::scanner::scan_directory;

/// Partials, layouts and client bundle built from one directory scan.
///
/// Every [`reload_all`](Self::reload_all) re-reads every file and rebuilds
/// everything from scratch. Nothing is cached between reloads.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    config: Config,
    partials: Registry,
    layouts: Registry,
    shared_templates: Arc<str>,
}

impl TemplateSet {
    /// Build a template set, performing the first load
    pub fn new(config: Config) -> Result<Self> {
        let mut set = Self {
            config,
            partials: Registry::new(),
            layouts: Registry::new(),
            shared_templates: Arc::from(""),
        };
        set.reload_all()?;
        Ok(set)
    }

    /// Re-read and recompile every template.
    ///
    /// The new partials, layouts and bundle replace the current ones only if
    /// every step succeeds; on error the previous state is left untouched.
    pub fn reload_all(&mut self) -> Result<()> {
        let wrapper = bundle::load_wrapper(self.config.shared_templates_template.as_deref())?;

        let partial_templates = scan_directory(self.config.effective_partials_directory())?;
        let partials = Registry::build(&partial_templates)?;

        let layouts = match &self.config.template_directory {
            Some(_) => partials.clone(),
            None => Registry::build(&scan_directory(self.config.effective_layouts_directory())?)?,
        };

        let shared_templates = bundle::render_bundle(&wrapper, &partial_templates)?;

        info!(
            partials = partials.len(),
            layouts = layouts.len(),
            "templates reloaded"
        );

        self.partials = partials;
        self.layouts = layouts;
        self.shared_templates = Arc::from(shared_templates);
        Ok(())
    }

    /// Compile a single template file outside of any registry
    pub fn compile_template_file(&self, path: impl AsRef<Path>) -> Result<Template> {
        reader::compile_template_file(path)
    }

    /// Render layout `name` with the current partials.
    ///
    /// Returns `None` when no layout has that name.
    pub fn render_layout(&self, name: &str, locals: Option<&Value>) -> Option<String> {
        self.layouts.render_with(name, locals, &self.partials)
    }

    /// Look up a partial by bare id or path-like name
    pub fn get_partial(&self, name: &str) -> Option<Arc<Template>> {
        self.partials.get(name).cloned()
    }

    /// Alias of [`get_partial`](Self::get_partial)
    pub fn get_template(&self, name: &str) -> Option<Arc<Template>> {
        self.get_partial(name)
    }

    /// Current partials registry
    pub fn partials(&self) -> &Registry {
        &self.partials
    }

    /// Current layouts registry
    pub fn layouts(&self) -> &Registry {
        &self.layouts
    }

    /// Current client bundle
    pub fn shared_templates(&self) -> Arc<str> {
        Arc::clone(&self.shared_templates)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let views = temp.path().join("views");
            fs::create_dir_all(views.join("partials")).unwrap();
            fs::create_dir_all(views.join("layouts")).unwrap();
            let config = Config::for_views(&views);
            Self {
                _temp: temp,
                config,
            }
        }

        fn partial(&self, file: &str, contents: &str) -> &Self {
            fs::write(self.config.partials_directory.join(file), contents).unwrap();
            self
        }

        fn layout(&self, file: &str, contents: &str) -> &Self {
            fs::write(self.config.layouts_directory.join(file), contents).unwrap();
            self
        }
    }

    #[test]
    fn test_header_renders_hello_world() {
        let fixture = Fixture::new();
        fixture.partial("header.mustache", "Hello {{name}}!");

        let set = TemplateSet::new(fixture.config.clone()).unwrap();
        let header = set.get_template("header").unwrap();
        assert_eq!(
            header.render(&json!({ "name": "World" }), set.partials()),
            "Hello World!"
        );
    }

    #[test]
    fn test_bom_never_reaches_output() {
        let fixture = Fixture::new();
        fixture.partial("bom.mustache", "\u{feff}<div>{{x}}</div>");

        let set = TemplateSet::new(fixture.config.clone()).unwrap();
        let html = set
            .get_partial("bom")
            .unwrap()
            .render(&json!({ "x": 1 }), set.partials());
        assert_eq!(html, "<div>1</div>");
        assert!(!set.shared_templates().contains('\u{feff}'));
    }

    #[test]
    fn test_render_layout_with_partials() {
        let fixture = Fixture::new();
        fixture
            .partial("nav.mustache", "<nav>{{user}}</nav>")
            .layout("main.mustache", "<body>{{> nav}}</body>");

        let set = TemplateSet::new(fixture.config.clone()).unwrap();
        assert_eq!(
            set.render_layout("main", Some(&json!({ "user": "ann" })))
                .as_deref(),
            Some("<body><nav>ann</nav></body>")
        );
        assert_eq!(set.render_layout("main", None).as_deref(), Some("<body><nav></nav></body>"));
        assert!(set.render_layout("missing", None).is_none());
    }

    #[test]
    fn test_reload_drops_deleted_templates() {
        let fixture = Fixture::new();
        fixture.partial("a.mustache", "A").partial("b.mustache", "B");

        let mut set = TemplateSet::new(fixture.config.clone()).unwrap();
        assert!(set.get_partial("b").is_some());

        fs::remove_file(fixture.config.partials_directory.join("b.mustache")).unwrap();
        set.reload_all().unwrap();

        assert!(set.get_partial("a").is_some());
        assert!(set.get_partial("b").is_none());
        assert!(!set.shared_templates().contains("\"b\": new Hogan.Template"));
    }

    #[test]
    fn test_stale_snapshot_survives_reload() {
        let fixture = Fixture::new();
        fixture.partial("greeting.mustache", "old");

        let mut set = TemplateSet::new(fixture.config.clone()).unwrap();
        let before = set.get_partial("greeting").unwrap();
        let bundle_before = set.shared_templates();

        fixture.partial("greeting.mustache", "new");
        set.reload_all().unwrap();

        assert_eq!(before.render(&json!({}), set.partials()), "old");
        assert_eq!(
            set.get_partial("greeting")
                .unwrap()
                .render(&json!({}), set.partials()),
            "new"
        );
        assert_ne!(bundle_before, set.shared_templates());
    }

    #[test]
    fn test_failed_reload_keeps_previous_state() {
        let fixture = Fixture::new();
        fixture.partial("ok.mustache", "fine");

        let mut set = TemplateSet::new(fixture.config.clone()).unwrap();
        let bundle_before = set.shared_templates();

        fixture.partial("broken.mustache", "{{#unclosed}}");
        let err = set.reload_all().unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));

        assert_eq!(set.partials().ids(), vec!["ok"]);
        assert_eq!(set.shared_templates(), bundle_before);
    }

    #[test]
    fn test_same_name_with_different_extensions() {
        let fixture = Fixture::new();
        fixture
            .partial("foo.html", "html")
            .partial("foo.mustache", "mustache");

        let set = TemplateSet::new(fixture.config.clone()).unwrap();
        assert_eq!(set.partials().ids(), vec!["foo"]);
        assert_eq!(
            set.get_partial("foo")
                .unwrap()
                .render(&json!({}), set.partials()),
            "mustache"
        );
        // The bundle keeps one entry per file
        assert_eq!(
            set.shared_templates()
                .matches("\"foo\": new Hogan.Template")
                .count(),
            2
        );
    }

    #[test]
    fn test_missing_directory_fails_init() {
        let config = Config::for_views("/nonexistent/views");
        let err = TemplateSet::new(config).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_bundle_marks_only_last_template() {
        let fixture = Fixture::new();
        fixture
            .partial("a.mustache", "A")
            .partial("b.mustache", "B")
            .partial("c.mustache", "C");
        let wrapper = fixture.config.views.join("wrapper.mustache");
        fs::write(
            &wrapper,
            "{{#templates}}{{id}}={{#last}}last{{/last}}{{^last}}more{{/last}};{{/templates}}",
        )
        .unwrap();

        let config = fixture.config.clone().with_shared_templates_template(&wrapper);
        let set = TemplateSet::new(config).unwrap();
        assert_eq!(&*set.shared_templates(), "a=more;b=more;c=last;");
    }

    #[test]
    fn test_single_root_mode() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("page.mustache"), "[{{> item}}]").unwrap();
        fs::write(temp.path().join("item.mustache"), "x").unwrap();

        let config = Config::default().with_template_directory(temp.path());
        let set = TemplateSet::new(config).unwrap();
        assert_eq!(set.render_layout("page", None).as_deref(), Some("[x]"));
        assert_eq!(set.partials().len(), 2);
    }

    #[test]
    fn test_compile_template_file() {
        let fixture = Fixture::new();
        let set = TemplateSet::new(fixture.config.clone()).unwrap();
        let path = fixture.config.views.join("one.mustache");
        fs::write(&path, "\u{feff}{{a}}").unwrap();

        let template = set.compile_template_file(&path).unwrap();
        assert_eq!(template.render(&json!({ "a": "b" }), set.partials()), "b");
        assert!(set.compile_template_file(fixture.config.views.join("none")).is_err());
    }
}
