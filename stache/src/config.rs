//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: STACHE_)
//! 2. Current working directory: ./stache.toml
//! 3. XDG config directory: ~/.config/stache/stache.toml
//! 4. Default values
//!
//! Keys may be written in snake_case or in the camelCase spelling used by
//! JavaScript view engines (`partialsDirectory`, `sharedTemplatesTemplate`, ...).
//! Every spelling is rewritten to the field name before extraction, so a file
//! key and an environment variable for the same field override each other.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
    Figment, Metadata, Profile, Provider,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the configuration file searched for on disk
pub const CONFIG_FILE_NAME: &str = "stache.toml";

/// Environment name that turns on per-request reloading
pub const DEVELOPMENT: &str = "development";

/// Template loading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory of layout templates
    #[serde(default = "default_layouts_directory")]
    pub layouts_directory: PathBuf,

    /// Directory of partial templates (also the source of the client bundle)
    #[serde(default = "default_partials_directory")]
    pub partials_directory: PathBuf,

    /// Single-root mode: one directory serving as partials and layouts
    #[serde(default)]
    pub template_directory: Option<PathBuf>,

    /// Wrapper template for the client bundle; the built-in one when unset
    #[serde(default)]
    pub shared_templates_template: Option<PathBuf>,

    /// Subdirectory of the host view root that holds partials
    #[serde(default = "default_partials_directory_name")]
    pub partials_directory_name: String,

    /// Host view root
    #[serde(default = "default_views")]
    pub views: PathBuf,

    /// Environment name (development, production, ...)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_views() -> PathBuf {
    PathBuf::from("views")
}

fn default_layouts_directory() -> PathBuf {
    default_views().join("layouts")
}

fn default_partials_directory() -> PathBuf {
    default_views().join("partials")
}

fn default_partials_directory_name() -> String {
    "partials".to_string()
}

fn default_environment() -> String {
    DEVELOPMENT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (first found wins):
    /// 1. Current working directory: ./stache.toml
    /// 2. XDG config directory: ~/.config/stache/stache.toml
    ///
    /// Environment variables (STACHE_ prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so that higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(CanonicalKeys(Toml::file(path)));
            }
        }

        let config = figment.merge(CanonicalKeys(Self::env_provider())).extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the search path; environment variables still override.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::extract(Toml::file(path.as_ref()), Self::env_provider())
    }

    fn extract(file: impl Provider, env: Env) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(CanonicalKeys(file))
            .merge(CanonicalKeys(env))
            .extract()?;

        Ok(config)
    }

    fn env_provider() -> Env {
        Env::prefixed("STACHE_")
    }

    /// Config file locations, highest priority first
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("stache");
        if let Some(path) = xdg_dirs.find_config_file(CONFIG_FILE_NAME) {
            paths.push(path);
        }

        paths
    }

    /// Configuration rooted at a host view directory.
    ///
    /// Partials live in `views/<partials_directory_name>` and layouts in
    /// `views/layouts`.
    pub fn for_views(views: impl Into<PathBuf>) -> Self {
        Self::default().with_views(views)
    }

    /// Set the host view root, re-deriving the partials and layouts directories
    #[must_use]
    pub fn with_views(mut self, views: impl Into<PathBuf>) -> Self {
        self.views = views.into();
        self.partials_directory = self.views.join(&self.partials_directory_name);
        self.layouts_directory = self.views.join("layouts");
        self
    }

    /// Set the layouts directory
    #[must_use]
    pub fn with_layouts_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.layouts_directory = dir.into();
        self
    }

    /// Set the partials directory
    #[must_use]
    pub fn with_partials_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.partials_directory = dir.into();
        self
    }

    /// Switch to single-root mode
    #[must_use]
    pub fn with_template_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_directory = Some(dir.into());
        self
    }

    /// Use a custom wrapper template for the client bundle
    #[must_use]
    pub fn with_shared_templates_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.shared_templates_template = Some(path.into());
        self
    }

    /// Set the environment name
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Directory scanned for partials (and the client bundle)
    pub fn effective_partials_directory(&self) -> &Path {
        self.template_directory
            .as_deref()
            .unwrap_or(&self.partials_directory)
    }

    /// Directory scanned for layouts
    pub fn effective_layouts_directory(&self) -> &Path {
        self.template_directory
            .as_deref()
            .unwrap_or(&self.layouts_directory)
    }

    /// Whether templates should be reloaded on every request
    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT
    }
}

/// Field name for any accepted spelling of a key.
///
/// Matching ignores case and underscores, so `partialsDirectory`,
/// `partials_directory` and the lowercased `partialsdirectory` produced by
/// environment variables all resolve to `partials_directory`.
fn canonical_key(key: &str) -> Option<&'static str> {
    let folded: String = key
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    match folded.as_str() {
        "layoutsdirectory" => Some("layouts_directory"),
        "partialsdirectory" => Some("partials_directory"),
        "templatedirectory" => Some("template_directory"),
        "sharedtemplatestemplate" | "sharedtemplatetemplate" => Some("shared_templates_template"),
        "partialsdirectoryname" => Some("partials_directory_name"),
        "views" => Some("views"),
        "environment" | "env" => Some("environment"),
        "loglevel" => Some("log_level"),
        _ => None,
    }
}

/// Provider adapter renaming top-level keys to their field names
struct CanonicalKeys<P>(P);

impl<P: Provider> Provider for CanonicalKeys<P> {
    fn metadata(&self) -> Metadata {
        self.0.metadata()
    }

    fn data(&self) -> figment::Result<Map<Profile, Dict>> {
        let mut data = self.0.data()?;
        for dict in data.values_mut() {
            let renames: Vec<(String, &'static str)> = dict
                .keys()
                .filter_map(|key| {
                    canonical_key(key)
                        .filter(|canonical| *canonical != key.as_str())
                        .map(|canonical| (key.clone(), canonical))
                })
                .collect();

            for (key, canonical) in renames {
                if let Some(value) = dict.remove(&key) {
                    dict.insert(canonical.to_string(), value);
                }
            }
        }
        Ok(data)
    }

    fn profile(&self) -> Option<Profile> {
        self.0.profile()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layouts_directory: default_layouts_directory(),
            partials_directory: default_partials_directory(),
            template_directory: None,
            shared_templates_template: None,
            partials_directory_name: default_partials_directory_name(),
            views: default_views(),
            environment: default_environment(),
            log_level: default_log_level(),
        }
    }
}
