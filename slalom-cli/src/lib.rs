// All core functionality is in slalom-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod batch;

// Re-export core types for convenience
pub use slalom_core::*;

pub use batch::{collect_documents, run_batch, BatchOptions, BatchSummary, DocumentOutcome};
