use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use stache::bundle::{load_wrapper, render_bundle};
use stache::config::Config;
use stache::scanner::scan_directory;

use crate::utils;

pub fn execute(
    config: &Config,
    partials: Option<&Path>,
    wrapper: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let partials_dir = partials.unwrap_or_else(|| config.effective_partials_directory());
    let wrapper_path = wrapper.or(config.shared_templates_template.as_deref());

    let bundle = build(partials_dir, wrapper_path)?;

    match output {
        Some(path) => {
            utils::write_file(path, bundle.as_bytes())?;
            utils::success(&format!("Wrote bundle to {}", path.display()));
        }
        None => {
            std::io::stdout()
                .write_all(bundle.as_bytes())
                .context("Failed to write bundle to stdout")?;
        }
    }

    Ok(())
}

fn build(partials_dir: &Path, wrapper_path: Option<&Path>) -> Result<String> {
    let wrapper = load_wrapper(wrapper_path).context("Failed to compile bundle wrapper template")?;
    let templates = scan_directory(partials_dir)
        .with_context(|| format!("Failed to read partials from {}", partials_dir.display()))?;
    let bundle = render_bundle(&wrapper, &templates).context("Failed to compile partials")?;
    Ok(bundle)
}
