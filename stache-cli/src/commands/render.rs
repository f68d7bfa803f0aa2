use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use stache::config::Config;
use stache::templates::TemplateSet;

pub fn execute(config: Config, layout: &str, data: Option<&Path>) -> Result<()> {
    let locals = data.map(read_data).transpose()?;
    let templates = TemplateSet::new(config).context("Failed to load templates")?;

    let html = templates
        .render_layout(layout, locals.as_ref())
        .with_context(|| format!("No layout named '{layout}'"))?;
    print!("{html}");

    Ok(())
}

fn read_data(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in data file: {}", path.display()))
}
