use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use stache::config::Config;

/// Load configuration from `path`, or from the default search path
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            Config::load_from(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => Config::load().context("Failed to load configuration"),
    }
}

/// Write file with content, creating parent directories
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Success message with checkmark
///
/// Status lines go to stderr so `render` and `bundle` output on stdout can be
/// piped or redirected without them.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Warning message, on stderr like [`success`]
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Section header
pub fn section(title: &str) {
    println!("\n{}", title.bold().underline());
}
