//! Directory scanning for template files

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::reader::read_template_file;

/// Template text read from one file, keyed by its logical name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTemplate {
    /// Logical name: file name without directory or extension
    pub id: String,
    /// File text with any byte-order mark removed
    pub contents: String,
    /// File the text was read from
    pub path: PathBuf,
}

/// Derive a template's logical name from a file name or path-like string.
///
/// Everything up to the last `/` (or `\`) is dropped, then everything from
/// the last `.` on. A name without an extension, or whose only dot is the
/// leading one (`.hidden`), is kept whole.
///
/// ```
/// use stache::scanner::template_id;
///
/// assert_eq!(template_id("views/partials/header.mustache"), "header");
/// assert_eq!(template_id("archive.tar.gz"), "archive.tar");
/// assert_eq!(template_id("README"), "README");
/// ```
pub fn template_id(name: &str) -> &str {
    let file_name = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(name);
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}

/// Read every file in `dir` (not recursing) as a [`RawTemplate`].
///
/// Entries are returned sorted by file name. Subdirectories are skipped.
/// A missing or unreadable directory, or an unreadable file, is an error.
pub fn scan_directory(dir: impl AsRef<Path>) -> Result<Vec<RawTemplate>> {
    let dir = dir.as_ref();
    let mut entries = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .map(|entry| entry.map_err(|e| Error::io(dir, e)))
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut templates = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            debug!(path = %path.display(), "skipping subdirectory");
            continue;
        }

        let file_name = entry.file_name();
        let contents = read_template_file(&path)?;
        templates.push(RawTemplate {
            id: template_id(&file_name.to_string_lossy()).to_string(),
            contents,
            path,
        });
    }

    debug!(
        directory = %dir.display(),
        count = templates.len(),
        "scanned template directory"
    );
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_id() {
        assert_eq!(template_id("header.mustache"), "header");
        assert_eq!(template_id("sub/dir/name.ext"), "name");
        assert_eq!(template_id(r"sub\dir\name.ext"), "name");
        assert_eq!(template_id("name"), "name");
        assert_eq!(template_id("a.b.c"), "a.b");
        assert_eq!(template_id(".hidden"), ".hidden");
        assert_eq!(template_id("trailing."), "trailing");
        assert_eq!(template_id(""), "");
    }

    #[test]
    fn test_scan_directory_reads_sorted_templates() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("header.mustache"), "Hello {{name}}!").unwrap();
        fs::write(temp.path().join("footer.mustache"), "\u{feff}Bye").unwrap();
        fs::write(temp.path().join("LICENSE"), "text").unwrap();

        let templates = scan_directory(temp.path()).unwrap();
        let ids: Vec<_> = templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["LICENSE", "footer", "header"]);
        assert_eq!(templates[1].contents, "Bye");
        assert_eq!(templates[2].contents, "Hello {{name}}!");
    }

    #[test]
    fn test_scan_directory_skips_subdirectories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("inner.mustache"), "x").unwrap();
        fs::write(temp.path().join("outer.mustache"), "y").unwrap();

        let templates = scan_directory(temp.path()).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id, "outer");
    }

    #[test]
    fn test_scan_missing_directory_is_an_error() {
        let err = scan_directory("/nonexistent/views/partials").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
