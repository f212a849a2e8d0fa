//! PDF Preprocessor
//!
//! Main preprocessor for PDF result sheets. Uses a pluggable backend to read
//! the text of each page, then joins the pages into one text blob.

pub mod backends;

use super::preprocessor::{has_extension, require_text, Preprocessor};
use crate::error::ExtractionError;
use std::path::Path;

pub use backends::PdfBackend;

#[cfg(feature = "lopdf-backend")]
pub use backends::LopdfBackend;

/// PDF Preprocessor with pluggable backend
///
/// Pages are concatenated in page order, each followed by a newline, so a
/// result line never spans two pages.
pub struct PdfPreprocessor {
    backend: Box<dyn PdfBackend>,
}

impl PdfPreprocessor {
    pub fn new(backend: Box<dyn PdfBackend>) -> Self {
        Self { backend }
    }

    /// Create PdfPreprocessor with the pure Rust lopdf backend
    #[cfg(feature = "lopdf-backend")]
    pub fn new_with_lopdf() -> Self {
        Self::new(Box::new(LopdfBackend::new()))
    }

    /// Get the backend name for logging
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

impl Preprocessor for PdfPreprocessor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let pages = self.backend.extract_pages(pdf_bytes)?;
        log::debug!("{} extracted {} pages", self.backend.name(), pages.len());

        let mut text = String::new();
        for page in pages {
            text.push_str(&page);
            text.push('\n');
        }
        require_text(text)
    }

    fn name(&self) -> &str {
        "PdfPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, "pdf")
    }
}
