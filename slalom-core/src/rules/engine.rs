use crate::config::DocumentFamily;
use crate::error::ConfigError;
use crate::types::{CompetitionMetadata, ResultRecord};
use regex::Regex;
use std::sync::LazyLock;

use super::header_detection::HeaderExtractor;
use super::result_line::ResultLineParser;

// Debug configuration for tracing lines the grammar rejects
#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub filter_patterns: Vec<String>,
}

impl DebugConfig {
    pub fn new(enabled: bool, filter_patterns: Vec<String>) -> Self {
        Self {
            enabled,
            filter_patterns,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            filter_patterns: Vec::new(),
        }
    }
}

/// Lines that match one of the debug filters but not the result grammar.
///
/// Filters are tried as regexes first and fall back to a plain substring
/// test. Returns `(line_number, line)` pairs, 1-indexed.
pub fn debug_unmatched_lines<'t>(
    text: &'t str,
    parser: &ResultLineParser,
    debug_config: &DebugConfig,
) -> Vec<(usize, &'t str)> {
    if !debug_config.enabled || debug_config.filter_patterns.is_empty() {
        return Vec::new();
    }

    let filters: Vec<Result<Regex, &str>> = debug_config
        .filter_patterns
        .iter()
        .map(|pattern| Regex::new(pattern).map_err(|_| pattern.as_str()))
        .collect();

    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            filters.iter().any(|filter| match filter {
                Ok(regex) => regex.is_match(line),
                Err(literal) => line.contains(*literal),
            })
        })
        .filter(|(_, line)| parser.parse_line(line).is_none())
        .map(|(index, line)| (index + 1, line))
        .collect()
}

/// The compiled grammar of one document family: header scans and the
/// result-line rule. Immutable once built.
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    family_id: String,
    header: HeaderExtractor,
    lines: ResultLineParser,
}

impl ExtractionEngine {
    pub fn new(family: &DocumentFamily) -> Result<Self, ConfigError> {
        Ok(Self {
            family_id: family.id.clone(),
            header: HeaderExtractor::new(family)?,
            lines: ResultLineParser::new(family)?,
        })
    }

    pub fn family_id(&self) -> &str {
        &self.family_id
    }

    pub fn header_extractor(&self) -> &HeaderExtractor {
        &self.header
    }

    pub fn line_parser(&self) -> &ResultLineParser {
        &self.lines
    }

    /// Header once per document, result rule once per line. The two passes
    /// are independent.
    pub fn extract(&self, text: &str) -> (CompetitionMetadata, Vec<ResultRecord>) {
        (self.header.extract(text), self.lines.parse_results(text))
    }

    pub fn count_matching_lines(&self, text: &str) -> usize {
        self.lines.count_matches(text)
    }
}

static DEFAULT_ENGINE: LazyLock<ExtractionEngine> = LazyLock::new(|| {
    ExtractionEngine::new(&DocumentFamily::u12_slalom()).expect("built-in family must compile")
});

/// Header metadata using the built-in family.
pub fn extract_header(full_text: &str) -> CompetitionMetadata {
    DEFAULT_ENGINE.header_extractor().extract(full_text)
}

/// One result line using the built-in family.
pub fn parse_result_line(line: &str) -> Option<ResultRecord> {
    DEFAULT_ENGINE.line_parser().parse_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
GRANDS CIRCUITS SLALOM 1
SLALOM FÉMININ
STONEHAM Dimanche 1/18/2026
1 101 DUPONT JEAN 2014 B CLUB U12 36,12 0,00
2 7 ROY SAM 2014 A MSA U12 38,61 2,49
3 9 CARON ZOE 2014 A MSA U12 DNF
";

    #[test]
    fn extract_runs_both_passes() {
        let engine = ExtractionEngine::new(&DocumentFamily::u12_slalom()).unwrap();
        let (metadata, records) = engine.extract(SHEET);
        assert_eq!(metadata.venue, "STONEHAM");
        assert_eq!(metadata.start_time, "");
        assert_eq!(records.len(), 2);
        assert_eq!(engine.count_matching_lines(SHEET), 2);
        assert_eq!(engine.family_id(), "u12-slalom");
    }

    #[test]
    fn default_family_helpers() {
        assert_eq!(extract_header(SHEET).date, "Dimanche 1/18/2026");
        assert_eq!(
            parse_result_line("1 101 DUPONT JEAN 2014 B CLUB U12 36,12 0,00")
                .unwrap()
                .name,
            "DUPONT JEAN"
        );
        assert!(parse_result_line("STONEHAM").is_none());
    }

    #[test]
    fn debug_lists_rejected_lines_matching_filter() {
        let engine = ExtractionEngine::new(&DocumentFamily::u12_slalom()).unwrap();
        let debug = DebugConfig::new(true, vec!["MSA".to_string()]);
        let unmatched = debug_unmatched_lines(SHEET, engine.line_parser(), &debug);
        assert_eq!(unmatched, vec![(6, "3 9 CARON ZOE 2014 A MSA U12 DNF")]);
    }

    #[test]
    fn debug_filter_falls_back_to_substring() {
        let engine = ExtractionEngine::new(&DocumentFamily::u12_slalom()).unwrap();
        let debug = DebugConfig::new(true, vec!["SLALOM (".to_string()]);
        let text = "SLALOM (finale)\n1 101 DUPONT JEAN 2014 B CLUB U12 36,12";
        let unmatched = debug_unmatched_lines(text, engine.line_parser(), &debug);
        assert_eq!(unmatched, vec![(1, "SLALOM (finale)")]);
    }

    #[test]
    fn disabled_debug_is_silent() {
        let engine = ExtractionEngine::new(&DocumentFamily::u12_slalom()).unwrap();
        let debug = DebugConfig::disabled();
        assert!(debug_unmatched_lines(SHEET, engine.line_parser(), &debug).is_empty());
    }
}
