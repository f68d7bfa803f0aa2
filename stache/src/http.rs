//! Axum integration: view engine with development-mode reloading
//!
//! [`ViewEngine`] wraps a [`TemplateSet`] for use from request handlers. In
//! the `development` environment, [`ViewEngine::attach`] installs a
//! middleware that recompiles every template before each request.
//!
//! ```rust,ignore
//! let host = HostSettings::new("views", "development");
//! let engine = ViewEngine::new(&host, Config::default())?;
//!
//! let app = Router::new()
//!     .route("/templates.js", get(shared_templates_handler))
//!     .route("/{layout}", get(layout_handler))
//!     .with_state(engine.clone());
//! let app = engine.attach(app);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{self, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Router,
};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::{Config, DEVELOPMENT};
use crate::error::{Error, Result};
use crate::mustache::{self, Template};
use crate::reader::strip_byte_order_mark;
use crate::templates::TemplateSet;

/// View settings of the host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    /// View root directory
    pub views: PathBuf,
    /// Environment name
    pub env: String,
}

impl HostSettings {
    pub fn new(views: impl Into<PathBuf>, env: impl Into<String>) -> Self {
        Self {
            views: views.into(),
            env: env.into(),
        }
    }

    /// Whether the host runs in the development environment
    pub fn is_development(&self) -> bool {
        self.env == DEVELOPMENT
    }
}

/// Shared handle over a [`TemplateSet`]
///
/// Clones share the same templates. Reloads are serialized by the inner lock.
#[derive(Debug, Clone)]
pub struct ViewEngine {
    inner: Arc<RwLock<TemplateSet>>,
    development: bool,
}

impl ViewEngine {
    /// Create a view engine for a host application.
    ///
    /// Partials are read from `views/<partials_directory_name>` and layouts
    /// from `views/layouts`, with `views` and the environment taken from
    /// `host`. The first load happens here.
    pub fn new(host: &HostSettings, config: Config) -> Result<Self> {
        let config = config
            .with_views(&host.views)
            .with_environment(&host.env);
        Self::from_config(config)
    }

    /// Create a view engine from a configuration as-is
    pub fn from_config(config: Config) -> Result<Self> {
        Ok(Self::from_template_set(TemplateSet::new(config)?))
    }

    pub fn from_template_set(templates: TemplateSet) -> Self {
        let development = templates.config().is_development();
        Self {
            inner: Arc::new(RwLock::new(templates)),
            development,
        }
    }

    /// Whether per-request reloading applies
    pub fn is_development(&self) -> bool {
        self.development
    }

    /// Rebuild every template on the blocking thread pool
    pub async fn reload_all(&self) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.blocking_write().reload_all())
            .await
            .map_err(|e| Error::Internal(format!("template reload task failed: {e}")))?
    }

    /// Middleware that reloads all templates before passing the request on.
    ///
    /// A failed reload short-circuits with the error response.
    /// Use with `axum::middleware::from_fn_with_state`.
    pub async fn middleware(
        State(engine): State<Self>,
        request: Request<Body>,
        next: Next,
    ) -> std::result::Result<Response, Error> {
        engine.reload_all().await?;
        Ok(next.run(request).await)
    }

    /// Install the reload middleware on `router` in development only
    pub fn attach<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if self.development {
            tracing::info!("template reloading enabled for every request");
            router.layer(axum::middleware::from_fn_with_state(
                self.clone(),
                Self::middleware,
            ))
        } else {
            router
        }
    }

    /// Compile `source` into a view bound to this engine's partials.
    ///
    /// `filename` is only used to locate syntax errors.
    pub fn compile(&self, source: &str, filename: impl AsRef<Path>) -> Result<View> {
        let template = mustache::compile(strip_byte_order_mark(source))
            .map_err(|e| Error::syntax_in(filename, e))?;
        Ok(View {
            template: Arc::new(template),
            engine: self.clone(),
        })
    }

    /// Current client bundle
    pub async fn shared_templates(&self) -> Arc<str> {
        self.inner.read().await.shared_templates()
    }

    pub async fn render_layout(&self, name: &str, locals: Option<&Value>) -> Option<String> {
        self.inner.read().await.render_layout(name, locals)
    }

    pub async fn get_partial(&self, name: &str) -> Option<Arc<Template>> {
        self.inner.read().await.get_partial(name)
    }

    /// Copy of the current template set
    pub async fn snapshot(&self) -> TemplateSet {
        self.inner.read().await.clone()
    }
}

/// A compiled template rendered against its engine's current partials
#[derive(Debug, Clone)]
pub struct View {
    template: Arc<Template>,
    engine: ViewEngine,
}

impl View {
    /// Render with `locals`; partials reloaded since compilation are picked up
    pub async fn render(&self, locals: &Value) -> String {
        let templates = self.engine.inner.read().await;
        self.template.render(locals, templates.partials())
    }
}

/// Serve the client bundle as JavaScript
pub async fn shared_templates_handler(State(engine): State<ViewEngine>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        engine.shared_templates().await.to_string(),
    )
}

/// Render the layout named by the `layout` path segment with empty locals
pub async fn layout_handler(
    State(engine): State<ViewEngine>,
    extract::Path(layout): extract::Path<String>,
) -> Response {
    match engine.render_layout(&layout, None).await {
        Some(html) => Html(html).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no layout named '{layout}'")).into_response(),
    }
}
