//! Document Preprocessors
//!
//! This module provides the text acquisition layer: it turns a document into
//! the newline-delimited UTF-8 text the extraction rules work on.
//!
//! ## Architecture
//!
//! ```text
//! Document (PDF, TXT)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! Page text (UTF-8, one line per printed line)
//!     ↓
//! [ExtractionEngine]
//!     ↓
//! ResultTable
//! ```
//!
//! ## Available Preprocessors
//!
//! - `PdfPreprocessor` - PDF documents via a pluggable backend (lopdf)
//! - `PlainTextPreprocessor` - text that was already extracted elsewhere

pub mod pdf;
pub mod preprocessor;
pub mod text;

// Re-export main types
pub use pdf::{PdfBackend, PdfPreprocessor};
pub use preprocessor::Preprocessor;
pub use text::PlainTextPreprocessor;

// Re-export backends
#[cfg(feature = "lopdf-backend")]
pub use pdf::LopdfBackend;
