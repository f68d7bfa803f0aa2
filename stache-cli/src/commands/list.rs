use anyhow::{Context, Result};
use colored::Colorize;

use stache::config::Config;
use stache::registry::Registry;
use stache::templates::TemplateSet;

use crate::utils;

pub fn execute(config: Config) -> Result<()> {
    let templates = TemplateSet::new(config).context("Failed to load templates")?;
    let config = templates.config();

    print_registry(
        &format!("Partials ({})", config.effective_partials_directory().display()),
        templates.partials(),
    );
    print_registry(
        &format!("Layouts ({})", config.effective_layouts_directory().display()),
        templates.layouts(),
    );

    Ok(())
}

fn print_registry(title: &str, registry: &Registry) {
    utils::section(title);
    if registry.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for id in registry.ids() {
        println!("  {id}");
    }
}
