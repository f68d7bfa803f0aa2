//! Error types and HTTP response conversion

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::mustache::SyntaxError;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for template loading
///
/// Every variant is a hard failure: it propagates to the caller of the
/// load/reload operation. Unknown template names are never errors; lookups
/// return `None` instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// A template file or directory could not be read
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read when the error occurred
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A template failed to compile
    #[error("{}{source}", path.as_ref().map(|p| format!("{}: ", p.display())).unwrap_or_default())]
    Syntax {
        /// Template file, when the source came from disk
        path: Option<PathBuf>,
        /// Parser error with line information
        #[source]
        source: SyntaxError,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap an I/O error with the path that produced it
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a syntax error raised while compiling the file at `path`
    pub fn syntax_in(path: impl AsRef<Path>, source: SyntaxError) -> Self {
        Self::Syntax {
            path: Some(path.as_ref().to_path_buf()),
            source,
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<SyntaxError> for Error {
    fn from(source: SyntaxError) -> Self {
        Error::Syntax { path: None, source }
    }
}

#[cfg(feature = "http")]
mod response {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use serde::{Deserialize, Serialize};

    use super::Error;

    /// Error response body
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        /// Error message
        pub error: String,

        /// Optional error code
        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<String>,

        /// HTTP status code
        pub status: u16,
    }

    impl ErrorResponse {
        /// Create error response with a code
        pub fn with_code(
            status: StatusCode,
            code: impl Into<String>,
            error: impl Into<String>,
        ) -> Self {
            Self {
                error: error.into(),
                code: Some(code.into()),
                status: status.as_u16(),
            }
        }
    }

    impl IntoResponse for Error {
        fn into_response(self) -> Response {
            let code = match &self {
                Error::Config(_) => "CONFIG_ERROR",
                Error::Io { .. } => "TEMPLATE_IO_ERROR",
                Error::Syntax { .. } => "TEMPLATE_SYNTAX_ERROR",
                Error::Internal(_) => "INTERNAL_ERROR",
            };
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            let body = ErrorResponse::with_code(status, code, self.to_string());
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(feature = "http")]
pub use response::ErrorResponse;
