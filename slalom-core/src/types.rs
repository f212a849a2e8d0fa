use serde::{Deserialize, Serialize};

// ===== DOCUMENT-LEVEL TYPES =====
// One CompetitionMetadata per document. Never merged across documents.

/// Whole-document facts pulled from the header text.
///
/// Every field is independently optional: an empty string means the pattern
/// was not found, and says nothing about the other fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionMetadata {
    /// Weekday name + numeric date, e.g. "Dimanche 1/18/2026"
    pub date: String,
    pub venue: String,
    /// e.g. "GRANDS CIRCUITS SLALOM 1 - SLALOM FÉMININ"
    pub competition_type: String,
    /// H:MM, e.g. "9:30"
    pub start_time: String,
}

impl CompetitionMetadata {
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
            && self.venue.is_empty()
            && self.competition_type.is_empty()
            && self.start_time.is_empty()
    }
}

// ===== PER-COMPETITOR TYPES =====

/// One decoded result line, kept as text exactly as printed
/// (apart from the decimal separator, which is normalized to a comma).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub rank: String,
    pub bib_number: String,
    pub name: String,
    /// Always four digits starting with "20"
    pub birth_year: String,
    /// Single letter A-D
    pub category: char,
    /// Uppercase club code
    pub club: String,
    pub raw_time: String,
    /// The canonical zero token when the sheet prints no gap (the leader)
    pub raw_gap: String,
}

/// Numbers derived from a `ResultRecord`. `None` means "could not be
/// computed" and is rendered as an empty field; it is never replaced by a
/// default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub elapsed_seconds: Option<f64>,
    pub gap_seconds: Option<f64>,
    pub score_percent: Option<f64>,
}

/// Final flat row: document metadata + record + derived numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    #[serde(flatten)]
    pub metadata: CompetitionMetadata,
    #[serde(flatten)]
    pub record: ResultRecord,
    #[serde(flatten)]
    pub derived: DerivedFields,
}

/// Everything extracted from one document.
///
/// An empty `rows` vector is the "no results extracted" outcome; it is a
/// distinct result from a document-level failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTable {
    /// File name (or other label) of the source document
    pub source: String,
    /// Id of the document family whose grammar produced the rows
    pub family_id: String,
    pub metadata: CompetitionMetadata,
    pub rows: Vec<OutputRow>,
}

impl ResultTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Which family grammar a document was matched against, and how well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub family_id: String,
    pub matched_lines: usize,
    /// Share of all family matches won by this family (0.0-1.0)
    pub confidence: f32,
}
