use crate::cache::{TextCacheKey, TextCacheValue};
use crate::classifier::DocumentClassifier;
use crate::config::{FamilyRegistry, ParsingConfig};
use crate::error::ExtractionError;
use crate::preprocessors::{PlainTextPreprocessor, Preprocessor};
use crate::rules::{debug_unmatched_lines, DebugConfig, ExtractionEngine};
use crate::storage::{calculate_document_hash, DocumentStorage, FileStorage, NoOpStorage};
use crate::table::TableBuilder;
use crate::types::*;
use anyhow::Result;
use std::path::Path;
use std::time::{Duration, Instant};

/// Pipeline stages of one document, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    CacheLookup,
    TextExtraction,
    ResultExtraction,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::CacheLookup => "cache",
            Stage::TextExtraction => "text",
            Stage::ResultExtraction => "results",
        }
    }
}

/// Stage timings for one document.
///
/// Timings are always recorded (the text extraction time goes into the
/// cache entry); `enabled` only controls whether the summary is printed.
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(Stage, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, stage: Stage, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        log::trace!("{} took {:?}", stage.label(), elapsed);
        self.timings.push((stage, elapsed));
        result
    }

    /// Time spent in `stage`, or `None` if it did not run (a cache hit
    /// skips text extraction).
    pub fn duration(&self, stage: Stage) -> Option<Duration> {
        self.timings
            .iter()
            .filter(|(recorded, _)| *recorded == stage)
            .map(|(_, elapsed)| *elapsed)
            .reduce(|a, b| a + b)
    }

    pub fn total(&self) -> Duration {
        self.timings.iter().map(|(_, elapsed)| *elapsed).sum()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.timings.iter().map(|(stage, _)| *stage).collect()
    }

    /// One line per document, e.g.
    /// `⏱️  sheet.pdf: read 1ms, text 140ms, results 2ms = 143ms (24 rows)`
    pub fn summary_line(&self, source: &str, rows: usize) -> String {
        let stages: Vec<String> = self
            .timings
            .iter()
            .map(|(stage, elapsed)| format!("{} {}ms", stage.label(), elapsed.as_millis()))
            .collect();
        format!(
            "⏱️  {}: {} = {}ms ({} rows)",
            source,
            stages.join(", "),
            self.total().as_millis(),
            rows
        )
    }

    pub fn print_summary(&self, source: &str, rows: usize) {
        if self.enabled {
            println!("{}", self.summary_line(source, rows));
        }
    }
}

/// Document → text → header + records → table.
///
/// Holds one compiled `ExtractionEngine` per known family. With a fixed
/// family every document goes through that engine; in auto mode the
/// classifier picks one per document.
pub struct DocumentProcessor {
    preprocessors: Vec<Box<dyn Preprocessor>>,
    storage: Box<dyn DocumentStorage + Send + Sync>,
    classifier: DocumentClassifier,
    engines: Vec<ExtractionEngine>,
    /// Index into `engines`, `None` in auto mode
    selected: Option<usize>,
    table_builder: TableBuilder,
    debug_config: DebugConfig,
}

impl DocumentProcessor {
    /// Create DocumentProcessor with full dependency injection
    ///
    /// Fails when a family pattern does not compile or the configured family
    /// id is unknown. Both are reported before any document is read.
    pub fn new_with_dependencies(
        preprocessors: Vec<Box<dyn Preprocessor>>,
        storage: Box<dyn DocumentStorage + Send + Sync>,
        config: &ParsingConfig,
    ) -> Result<Self> {
        let registry = FamilyRegistry::from_config(config)?;
        let engines = registry
            .families()
            .iter()
            .map(ExtractionEngine::new)
            .collect::<Result<Vec<_>, _>>()?;

        let selected = if config.is_auto_family() {
            None
        } else {
            let family = registry.get(&config.family)?;
            engines.iter().position(|engine| engine.family_id() == family.id)
        };

        Ok(Self {
            preprocessors,
            storage,
            classifier: DocumentClassifier::new(),
            engines,
            selected,
            table_builder: TableBuilder::new(),
            debug_config: DebugConfig::disabled(),
        })
    }

    /// Convenience constructor for CLI usage: PDF (when built with a PDF
    /// backend) and plain text preprocessors, file cache unless `cache_dir`
    /// is `None`.
    pub fn new_cli(config: &ParsingConfig, cache_dir: Option<&str>) -> Result<Self> {
        let mut preprocessors: Vec<Box<dyn Preprocessor>> = Vec::new();
        #[cfg(feature = "lopdf-backend")]
        preprocessors.push(Box::new(crate::preprocessors::PdfPreprocessor::new_with_lopdf()));
        preprocessors.push(Box::new(PlainTextPreprocessor::new()));

        let storage: Box<dyn DocumentStorage + Send + Sync> = match cache_dir {
            Some(dir) => Box::new(FileStorage::new(dir)?),
            None => Box::new(NoOpStorage::new()),
        };
        Self::new_with_dependencies(preprocessors, storage, config)
    }

    pub fn set_debug_config(&mut self, debug_config: DebugConfig) {
        self.debug_config = debug_config;
    }

    pub fn family_ids(&self) -> Vec<&str> {
        self.engines.iter().map(|engine| engine.family_id()).collect()
    }

    pub fn supports_file_type(&self, path: &Path) -> bool {
        self.preprocessor_for(path).is_some()
    }

    fn preprocessor_for(&self, path: &Path) -> Option<&dyn Preprocessor> {
        self.preprocessors
            .iter()
            .find(|preprocessor| preprocessor.supports_file_type(path))
            .map(|preprocessor| preprocessor.as_ref())
    }

    fn select_engine(&self, text: &str) -> &ExtractionEngine {
        if let Some(index) = self.selected {
            return &self.engines[index];
        }
        self.classifier
            .classify(text, &self.engines)
            .and_then(|classification| {
                self.engines
                    .iter()
                    .find(|engine| engine.family_id() == classification.family_id)
            })
            .unwrap_or(&self.engines[0])
    }

    /// Text → table. Never fails: a text without any result line yields an
    /// empty table, and header fields that are not found stay empty.
    pub fn process_text(&self, source: &str, text: &str) -> ResultTable {
        let engine = self.select_engine(text);

        if self.debug_config.enabled {
            for (line_number, line) in
                debug_unmatched_lines(text, engine.line_parser(), &self.debug_config)
            {
                println!("🔍 {}:{} not a result line: {}", source, line_number, line.trim());
            }
        }

        let (metadata, results) = engine.extract(text);
        if metadata.is_empty() && !results.is_empty() {
            log::warn!(
                "{}: no header metadata found, output name falls back to defaults",
                source
            );
        }
        log::debug!(
            "{}: {} result lines with family {}",
            source,
            results.len(),
            engine.family_id()
        );
        self.table_builder
            .build_table(source, engine.family_id(), metadata, &results)
    }

    /// Read a document and return its text, going through the cache.
    ///
    /// Cache failures are logged and otherwise ignored; only a failure to
    /// read or extract the document itself is an error.
    pub fn extract_document_text(
        &self,
        input_path: &Path,
        skip_cache: bool,
        profiler: &mut StepProfiler,
    ) -> Result<String, ExtractionError> {
        let preprocessor = self.preprocessor_for(input_path).ok_or_else(|| {
            ExtractionError::UnsupportedFileType(input_path.display().to_string())
        })?;

        let bytes = profiler.time_step(Stage::Read, || {
            std::fs::read(input_path).map_err(|source| ExtractionError::Io {
                path: input_path.display().to_string(),
                source,
            })
        })?;
        let cache_key = TextCacheKey::new(calculate_document_hash(&bytes), preprocessor.name());

        if skip_cache {
            println!("🚫 Skipping cache lookup (--skip-cache enabled)");
        } else {
            match profiler.time_step(Stage::CacheLookup, || self.storage.get_text_output(&cache_key)) {
                Ok(Some(cached)) => {
                    println!("🎯 Cache hit: text for {}", input_path.display());
                    return Ok(cached.text);
                }
                Ok(None) => {}
                Err(e) => log::warn!("cache lookup failed for {}: {}", input_path.display(), e),
            }
        }

        let text = profiler.time_step(Stage::TextExtraction, || preprocessor.extract_text(&bytes))?;

        if !skip_cache {
            let extraction_ms = profiler
                .duration(Stage::TextExtraction)
                .map_or(0, |elapsed| elapsed.as_millis() as u64);
            let cache_value = TextCacheValue::new(text.clone(), extraction_ms);
            if let Err(e) = self.storage.store_text_output(&cache_key, &cache_value) {
                log::warn!("cache store failed for {}: {}", input_path.display(), e);
            }
        }

        Ok(text)
    }

    /// Simple document processing function
    pub fn process_document(&self, input_path: &Path) -> Result<ResultTable> {
        self.process_document_with_profiling(input_path, false, false)
    }

    /// Full pipeline for one document, optionally timed step by step
    pub fn process_document_with_profiling(
        &self,
        input_path: &Path,
        enable_profiling: bool,
        skip_cache: bool,
    ) -> Result<ResultTable> {
        let mut profiler = StepProfiler::new(enable_profiling);

        println!("📄 Processing document: {}", input_path.display());
        let text = self.extract_document_text(input_path, skip_cache, &mut profiler)?;

        let source = input_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input_path.display().to_string());
        let table = profiler.time_step(Stage::ResultExtraction, || self.process_text(&source, &text));

        profiler.print_summary(&source, table.len());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentFamily;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const SHEET: &str = "\
GRANDS CIRCUITS SLALOM 1
SLALOM FÉMININ
STONEHAM Dimanche 1/18/2026 Heure de début: 9:30
1 101 DUPONT JEAN 2014 B CLUB U12 36,12
2 7 ROY SAM 2014 A MSA U12 38,61 2,49
";

    /// Text preprocessor that counts how often it is asked for text
    struct CountingPreprocessor(Arc<AtomicUsize>);

    impl Preprocessor for CountingPreprocessor {
        fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            PlainTextPreprocessor::new().extract_text(bytes)
        }

        fn name(&self) -> &str {
            "CountingPreprocessor"
        }

        fn supports_file_type(&self, path: &Path) -> bool {
            path.extension().is_some_and(|ext| ext == "txt")
        }
    }

    fn text_processor(config: &ParsingConfig) -> DocumentProcessor {
        DocumentProcessor::new_with_dependencies(
            vec![Box::new(PlainTextPreprocessor::new())],
            Box::new(NoOpStorage::new()),
            config,
        )
        .unwrap()
    }

    #[test]
    fn process_text_builds_rows() {
        let table = text_processor(&ParsingConfig::default()).process_text("sheet.txt", SHEET);
        assert_eq!(table.family_id, "u12-slalom");
        assert_eq!(table.metadata.start_time, "9:30");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].record.raw_gap, "0,00");
        assert_eq!(table.rows[0].derived.score_percent, Some(100.0));
    }

    #[test]
    fn text_without_results_gives_empty_table() {
        let table = text_processor(&ParsingConfig::default()).process_text("x", "STONEHAM\n");
        assert!(table.is_empty());
        assert_eq!(table.metadata.venue, "STONEHAM");
    }

    #[test]
    fn rows_without_header_keep_empty_metadata() {
        let table = text_processor(&ParsingConfig::default())
            .process_text("rows.txt", "1 101 DUPONT JEAN 2014 B CLUB U12 36,12\n");
        assert_eq!(table.len(), 1);
        assert!(table.metadata.is_empty());

        let table = text_processor(&ParsingConfig::default()).process_text("sheet.txt", SHEET);
        assert!(!table.metadata.is_empty());
    }

    #[test]
    fn unknown_family_is_rejected_up_front() {
        let config = ParsingConfig {
            family: "u16-giant".to_string(),
            ..ParsingConfig::default()
        };
        let result = DocumentProcessor::new_with_dependencies(
            vec![Box::new(PlainTextPreprocessor::new())],
            Box::new(NoOpStorage::new()),
            &config,
        );
        let err = result.err().unwrap();
        assert!(err.to_string().contains("u16-giant"), "got {err}");
    }

    #[test]
    fn auto_mode_classifies_each_document() {
        let mut u14 = DocumentFamily::u12_slalom();
        u14.id = "u14-slalom".to_string();
        u14.age_group_tag = "U14".to_string();
        let config = ParsingConfig {
            family: "auto".to_string(),
            families: vec![u14],
            ..ParsingConfig::default()
        };
        let processor = text_processor(&config);
        assert_eq!(processor.family_ids(), vec!["u12-slalom", "u14-slalom"]);

        let table = processor.process_text("u14.txt", "1 4 ROY SAM 2012 A MSA U14 36,00\n");
        assert_eq!(table.family_id, "u14-slalom");
        assert_eq!(table.len(), 1);

        let table = processor.process_text("u12.txt", SHEET);
        assert_eq!(table.family_id, "u12-slalom");
    }

    #[test]
    fn process_document_reads_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stoneham.txt");
        std::fs::write(&path, SHEET).unwrap();

        let table = text_processor(&ParsingConfig::default())
            .process_document(&path)
            .unwrap();
        assert_eq!(table.source, "stoneham.txt");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn unsupported_and_missing_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let processor = text_processor(&ParsingConfig::default());

        let docx = dir.path().join("sheet.docx");
        std::fs::write(&docx, "x").unwrap();
        assert!(!processor.supports_file_type(&docx));
        assert!(processor.process_document(&docx).is_err());

        assert!(processor
            .process_document(&dir.path().join("missing.txt"))
            .is_err());
    }

    #[test]
    fn second_run_hits_the_text_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stoneham.txt");
        std::fs::write(&path, SHEET).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let processor = DocumentProcessor::new_with_dependencies(
            vec![Box::new(CountingPreprocessor(calls.clone()))],
            Box::new(FileStorage::new(dir.path().join("cache")).unwrap()),
            &ParsingConfig::default(),
        )
        .unwrap();

        let first = processor.process_document(&path).unwrap();
        let second = processor.process_document(&path).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.rows, second.rows);

        processor
            .process_document_with_profiling(&path, false, true)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn profiler_records_stages_in_order() {
        let mut profiler = StepProfiler::new(false);
        let value = profiler.time_step(Stage::Read, || 42);
        assert_eq!(value, 42);
        profiler.time_step(Stage::ResultExtraction, || ());

        // Recorded even when printing is off
        assert_eq!(profiler.stages(), vec![Stage::Read, Stage::ResultExtraction]);
        assert!(profiler.duration(Stage::Read).is_some());
        assert!(profiler.duration(Stage::TextExtraction).is_none());
        assert!(profiler.total() >= profiler.duration(Stage::Read).unwrap());
    }

    #[test]
    fn profiler_summary_names_document_and_rows() {
        let mut profiler = StepProfiler::new(true);
        profiler.time_step(Stage::Read, || ());
        profiler.time_step(Stage::CacheLookup, || ());

        let line = profiler.summary_line("stoneham.pdf", 24);
        assert!(line.starts_with("⏱️  stoneham.pdf: read "), "got {line}");
        assert!(line.contains(", cache "), "got {line}");
        assert!(line.ends_with("ms (24 rows)"), "got {line}");
    }

    #[test]
    fn cache_hit_skips_text_extraction_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stoneham.txt");
        std::fs::write(&path, SHEET).unwrap();
        let processor = DocumentProcessor::new_with_dependencies(
            vec![Box::new(PlainTextPreprocessor::new())],
            Box::new(FileStorage::new(dir.path().join("cache")).unwrap()),
            &ParsingConfig::default(),
        )
        .unwrap();

        let mut first = StepProfiler::new(false);
        processor.extract_document_text(&path, false, &mut first).unwrap();
        assert_eq!(
            first.stages(),
            vec![Stage::Read, Stage::CacheLookup, Stage::TextExtraction]
        );

        let mut second = StepProfiler::new(false);
        processor.extract_document_text(&path, false, &mut second).unwrap();
        assert_eq!(second.stages(), vec![Stage::Read, Stage::CacheLookup]);
    }
}
