use anyhow::{Context, Result};
use rust_embed::Embed;
use std::path::{Path, PathBuf};

use stache::bundle::DEFAULT_SHARED_TEMPLATES;

use crate::utils;

/// Starter views and configuration, embedded at compile time
#[derive(Embed)]
#[folder = "templates/"]
#[prefix = ""]
struct Scaffold;

const SHARED_TEMPLATES_PATH: &str = "views/sharedTemplates.mustache";

pub fn execute(dir: &Path, force: bool) -> Result<()> {
    let written = scaffold(dir, force)?;

    if written.is_empty() {
        utils::warning("Nothing written; every file already exists (use --force to overwrite)");
    } else {
        utils::success(&format!(
            "Created {} file(s) in {}",
            written.len(),
            dir.display()
        ));
    }

    Ok(())
}

/// Copy the scaffold into `dir`, returning the files written.
///
/// Existing files are left alone unless `force` is set.
fn scaffold(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let mut files: Vec<(String, Vec<u8>)> = Scaffold::iter()
        .filter_map(|name| {
            Scaffold::get(&name).map(|file| (name.to_string(), file.data.into_owned()))
        })
        .collect();
    files.push((
        SHARED_TEMPLATES_PATH.to_string(),
        DEFAULT_SHARED_TEMPLATES.as_bytes().to_vec(),
    ));
    files.sort();

    let mut written = Vec::new();
    for (name, data) in files {
        let dest = dir.join(&name);
        if dest.exists() && !force {
            utils::warning(&format!("Skipping existing file: {}", dest.display()));
            continue;
        }
        utils::write_file(&dest, &data)
            .with_context(|| format!("Failed to scaffold {name}"))?;
        written.push(dest);
    }

    Ok(written)
}
