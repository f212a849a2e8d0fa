//! Typed failures for the two places a document can genuinely fail:
//! text acquisition and grammar configuration.
//!
//! Data-quality problems (unparseable times, non-matching lines) are never
//! errors; they surface as `None` fields or skipped lines instead.

use thiserror::Error;

/// Document-level failure: the text could not be obtained, so the whole
/// document is abandoned.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{backend} backend failed: {message}")]
    Backend { backend: String, message: String },

    #[error("document text is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),

    #[error("no text could be extracted from the document")]
    EmptyText,

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
}

impl ExtractionError {
    pub fn backend(backend: &str, message: impl std::fmt::Display) -> Self {
        Self::Backend {
            backend: backend.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field} pattern '{pattern}' in family '{family}': {source}")]
    InvalidPattern {
        family: String,
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown document family '{0}'")]
    UnknownFamily(String),

    #[error("document family '{0}' is defined more than once")]
    DuplicateFamily(String),

    #[error("unknown output format '{0}' (expected csv or json)")]
    UnknownFormat(String),
}
