//! Batch driver: find documents, run each through the processor, write one
//! table per document and keep score of what happened.
//!
//! A document that fails never stops the batch. Its siblings are processed
//! as if it were not there.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use slalom_core::table::{extension_for, output_file_name};
use slalom_core::{DocumentProcessor, OutputConfig};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(wanted))
}

fn is_candidate(path: &Path, include_text: bool) -> bool {
    has_extension(path, "pdf") || (include_text && has_extension(path, "txt"))
}

/// A single file is returned as is. A directory is walked recursively for
/// `.pdf` files (and `.txt` with `include_text`), sorted by path.
pub fn collect_documents(input: &Path, include_text: bool) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(anyhow!("'{}' is neither a file nor a directory", input.display()));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping unreadable entry under {}: {}", input.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() && is_candidate(entry.path(), include_text) {
            documents.push(entry.into_path());
        }
    }
    documents.sort();
    Ok(documents)
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Write tables here instead of next to each source document
    pub output_dir: Option<PathBuf>,
    pub output: OutputConfig,
    pub profile: bool,
    pub skip_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Written {
        source: PathBuf,
        output: PathBuf,
        rows: usize,
    },
    /// Text was read but no line matched the result grammar
    NoResults { source: PathBuf },
    Failed { source: PathBuf, error: String },
}

impl DocumentOutcome {
    pub fn source(&self) -> &Path {
        match self {
            Self::Written { source, .. } | Self::NoResults { source } | Self::Failed { source, .. } => {
                source
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub documents: Vec<DocumentOutcome>,
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            documents: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: DocumentOutcome) {
        self.documents.push(outcome);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn succeeded(&self) -> usize {
        self.documents.iter().filter(|d| d.is_success()).count()
    }

    pub fn no_results(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d, DocumentOutcome::NoResults { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d, DocumentOutcome::Failed { .. }))
            .count()
    }

    /// Every document produced a table
    pub fn is_success(&self) -> bool {
        self.succeeded() == self.documents.len()
    }

    fn already_written(&self, output: &Path) -> bool {
        self.documents
            .iter()
            .any(|d| matches!(d, DocumentOutcome::Written { output: o, .. } if o == output))
    }

    pub fn print(&self) {
        let total = self.documents.len();
        println!("\n📊 Batch Summary:");
        println!("   ✅ Tables written: {}/{}", self.succeeded(), total);
        for document in &self.documents {
            if let DocumentOutcome::Written { output, rows, .. } = document {
                println!("      ✓ {} ({} rows)", output.display(), rows);
            }
        }
        if self.no_results() > 0 {
            println!("   ⚠️  No results extracted: {}/{}", self.no_results(), total);
        }
        if self.failed() > 0 {
            println!("   ❌ Failed: {}/{}", self.failed(), total);
        }
        for document in &self.documents {
            match document {
                DocumentOutcome::NoResults { source } => {
                    println!("      ✗ {} (no results)", source.display())
                }
                DocumentOutcome::Failed { source, error } => {
                    println!("      ✗ {} ({})", source.display(), error)
                }
                DocumentOutcome::Written { .. } => {}
            }
        }
    }

    pub fn save_to_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize batch summary: {}", e))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Process one document and write its table. Never returns an error: every
/// failure becomes a `Failed` outcome for this document only.
pub fn process_one(
    processor: &DocumentProcessor,
    source: &Path,
    options: &BatchOptions,
) -> DocumentOutcome {
    let table = match processor.process_document_with_profiling(source, options.profile, options.skip_cache) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("  ❌ Could not extract text: {e:#}");
            return DocumentOutcome::Failed {
                source: source.to_path_buf(),
                error: format!("{e:#}"),
            };
        }
    };

    if table.is_empty() {
        println!("  ⚠️  No results extracted");
        return DocumentOutcome::NoResults {
            source: source.to_path_buf(),
        };
    }
    println!("  ✓ {} results extracted", table.len());

    let directory = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let output = directory.join(output_file_name(
        &table.metadata,
        extension_for(&options.output.format),
    ));

    match table.save_with_format(&output, &options.output) {
        Ok(()) => {
            println!("  💾 Saved to {}", output.display());
            DocumentOutcome::Written {
                source: source.to_path_buf(),
                output,
                rows: table.len(),
            }
        }
        Err(e) => {
            eprintln!("  ❌ Could not write {}: {e:#}", output.display());
            DocumentOutcome::Failed {
                source: source.to_path_buf(),
                error: format!("{e:#}"),
            }
        }
    }
}

pub fn run_batch(
    processor: &DocumentProcessor,
    documents: &[PathBuf],
    options: &BatchOptions,
) -> Result<BatchSummary> {
    if let Some(dir) = &options.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut summary = BatchSummary::new();
    for (index, document) in documents.iter().enumerate() {
        println!("\n[{}/{}] {}", index + 1, documents.len(), document.display());
        let outcome = process_one(processor, document, options);
        if let DocumentOutcome::Written { output, .. } = &outcome {
            if summary.already_written(output) {
                log::warn!(
                    "{} overwrote a table written earlier in this batch",
                    output.display()
                );
            }
        }
        summary.record(outcome);
    }
    summary.finish();
    Ok(summary)
}
