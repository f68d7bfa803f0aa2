//! # stache
//!
//! Mustache template loader with server-side layouts and a pre-compiled
//! client bundle.
//!
//! ## Features
//!
//! - **Directory loading**: partials and layouts read from disk, keyed by file name
//! - **Server rendering**: layouts rendered with every partial available for inclusion
//! - **Client bundle**: partials compiled to Hogan.js render functions in one script
//! - **Dev reload**: axum middleware recompiling everything per request (feature `http`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use stache::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let templates = TemplateSet::new(config)?;
//!     if let Some(html) = templates.render_layout("main", Some(&json!({ "title": "Home" }))) {
//!         println!("{html}");
//!     }
//!     std::fs::write("public/templates.js", &*templates.shared_templates())
//!         .map_err(|e| Error::io("public/templates.js", e))?;
//!
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod config;
pub mod error;
pub mod mustache;
pub mod observability;
pub mod reader;
pub mod registry;
pub mod scanner;
pub mod templates;

#[cfg(feature = "http")]
pub mod http;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::mustache::{PartialLookup, Template};
    pub use crate::observability::init_tracing;
    pub use crate::registry::Registry;
    pub use crate::templates::TemplateSet;

    #[cfg(feature = "http")]
    pub use crate::http::{layout_handler, shared_templates_handler, HostSettings, View, ViewEngine};
}
