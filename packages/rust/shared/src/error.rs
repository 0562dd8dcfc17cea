//! Error types for Folio.
//!
//! Library crates use [`FolioError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Folio operations.
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport failure or non-success HTTP status from the content API.
    #[error("network error: {0}")]
    Network(String),

    /// The content API answered with GraphQL `errors`.
    #[error("query error: {0}")]
    Query(String),

    /// The response body could not be decoded into the expected shape.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input (malformed endpoint, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// HTML-to-Markdown conversion error.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a decode error from any displayable message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = FolioError::config("no content endpoint configured");
        assert_eq!(err.to_string(), "config error: no content endpoint configured");

        let err = FolioError::Query("field 'tags' not found".into());
        assert!(err.to_string().starts_with("query error:"));

        let err = FolioError::decode("missing field `data`");
        assert!(err.to_string().contains("missing field"));
    }
}
