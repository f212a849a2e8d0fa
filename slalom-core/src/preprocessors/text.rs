//! Passthrough for documents that are already text (e.g. the output of an
//! external PDF-to-text tool).

use super::preprocessor::{has_extension, require_text, Preprocessor};
use crate::error::ExtractionError;
use std::path::Path;

#[derive(Debug, Default)]
pub struct PlainTextPreprocessor;

impl PlainTextPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Preprocessor for PlainTextPreprocessor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let bytes = bytes.strip_prefix("\u{feff}".as_bytes()).unwrap_or(bytes);
        let text = String::from_utf8(bytes.to_vec())?;
        require_text(text)
    }

    fn name(&self) -> &str {
        "PlainTextPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, "txt")
    }
}
