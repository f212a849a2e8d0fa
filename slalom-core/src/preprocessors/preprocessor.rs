// Preprocessor abstraction for text acquisition
//
// This module defines the boundary between getting text out of a document
// (PDF -> text) and the extraction rules (text -> records). Everything after
// this boundary only sees text and is format-agnostic.

use crate::error::ExtractionError;
use std::path::Path;

/// Preprocessor trait - converts a document to page text
///
/// A failure here abandons the whole document: no partial output is written
/// for it, and sibling documents in a batch are unaffected.
pub trait Preprocessor: Send + Sync {
    /// Convert raw document bytes to newline-delimited text
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;

    /// Convenience method: read the file and extract its text
    fn extract_file(&self, input: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(input).map_err(|source| ExtractionError::Io {
            path: input.display().to_string(),
            source,
        })?;
        self.extract_text(&bytes)
    }

    /// Get preprocessor name for logging and cache keys
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Case-insensitive extension test shared by the preprocessors.
pub(crate) fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(wanted))
}

/// Whitespace-only text counts as no text at all.
pub(crate) fn require_text(text: String) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        Err(ExtractionError::EmptyText)
    } else {
        Ok(text)
    }
}
