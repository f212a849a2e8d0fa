// Slalom Results Core Library
//
// Turns ski slalom result sheets (PDF or extracted text) into one row per
// competitor with the sheet's header metadata, elapsed time in seconds and a
// relative score. Main interface: DocumentProcessor.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod preprocessors;
pub mod processor;
pub mod rules;
pub mod storage;
pub mod table;
pub mod types;

// Re-export main types and functions for easy use
pub use config::{DocumentFamily, FamilyRegistry, OutputConfig, ParsingConfig, SUPPORTED_FORMATS};
pub use error::{ConfigError, ExtractionError};
pub use preprocessors::{PdfBackend, PdfPreprocessor, PlainTextPreprocessor, Preprocessor};
pub use processor::{DocumentProcessor, Stage, StepProfiler};
pub use rules::{compute_score, extract_header, parse_result_line, parse_time, DebugConfig};
pub use table::{output_file_name, TableBuilder};
pub use types::*;

// Re-export backends for direct use
#[cfg(feature = "lopdf-backend")]
pub use preprocessors::LopdfBackend;
