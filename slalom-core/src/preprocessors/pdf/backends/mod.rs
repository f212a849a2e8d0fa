//! PDF Backend trait
//!
//! Defines the interface that all PDF text backends must implement.

use crate::error::ExtractionError;

/// Backend trait for PDF text extraction
///
/// Backends return one string per page, in page order, with printed lines
/// separated by newlines.
pub trait PdfBackend: Send + Sync {
    /// Extract the text of every page
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &str;
}

#[cfg(feature = "lopdf-backend")]
pub mod lopdf;

#[cfg(feature = "lopdf-backend")]
pub use self::lopdf::LopdfBackend;
