//! Template file reading

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::mustache::{self, Template};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Read a UTF-8 template file, dropping a leading byte-order mark.
pub fn read_template_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(strip_byte_order_mark(&text).to_string())
}

/// Read and compile one template file
pub fn compile_template_file(path: impl AsRef<Path>) -> Result<Template> {
    let path = path.as_ref();
    let text = read_template_file(path)?;
    mustache::compile(&text).map_err(|e| Error::syntax_in(path, e))
}

/// Remove leading U+FEFF marks from `text`; anything else, including the
/// empty string, is returned unchanged.
///
/// Repeated marks are all removed so that stripping twice equals stripping once.
pub fn strip_byte_order_mark(text: &str) -> &str {
    text.trim_start_matches(BYTE_ORDER_MARK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_strip_byte_order_mark() {
        assert_eq!(strip_byte_order_mark("\u{feff}<div>"), "<div>");
        assert_eq!(strip_byte_order_mark("<div>"), "<div>");
        assert_eq!(strip_byte_order_mark(""), "");
    }

    #[test]
    fn test_strip_byte_order_mark_is_idempotent() {
        for input in ["\u{feff}x", "\u{feff}\u{feff}x", "x\u{feff}", "x", ""] {
            let once = strip_byte_order_mark(input);
            assert_eq!(strip_byte_order_mark(once), once);
        }
    }

    #[test]
    fn test_read_template_file_strips_bom() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bom.mustache");
        fs::write(&path, "\u{feff}<div>{{x}}</div>").unwrap();

        assert_eq!(read_template_file(&path).unwrap(), "<div>{{x}}</div>");
    }

    #[test]
    fn test_compile_template_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.mustache");
        fs::write(&path, "line one\n{{#section}}").unwrap();

        match compile_template_file(&path).unwrap_err() {
            Error::Syntax { path: Some(p), source } => {
                assert_eq!(p, path);
                assert_eq!(source.line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let err = read_template_file("/nonexistent/template.mustache").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
