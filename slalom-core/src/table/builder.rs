use crate::rules::{compute_score, parse_time};
use crate::types::*;

impl DerivedFields {
    /// Elapsed and gap through the time codec, score from both.
    pub fn from_record(record: &ResultRecord) -> Self {
        let elapsed_seconds = parse_time(&record.raw_time);
        let gap_seconds = parse_time(&record.raw_gap);
        Self {
            elapsed_seconds,
            gap_seconds,
            score_percent: compute_score(elapsed_seconds, gap_seconds),
        }
    }
}

/// One row per record, in encounter order, with the document metadata
/// repeated on every row. No sorting, grouping or de-duplication.
pub fn assemble(metadata: &CompetitionMetadata, results: &[ResultRecord]) -> Vec<OutputRow> {
    results
        .iter()
        .map(|record| OutputRow {
            metadata: metadata.clone(),
            record: record.clone(),
            derived: DerivedFields::from_record(record),
        })
        .collect()
}

pub struct TableBuilder;

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_table(
        &self,
        source: &str,
        family_id: &str,
        metadata: CompetitionMetadata,
        results: &[ResultRecord],
    ) -> ResultTable {
        let rows = assemble(&metadata, results);

        let unscored = rows
            .iter()
            .filter(|row| row.derived.score_percent.is_none())
            .count();
        if unscored > 0 {
            log::warn!("{source}: {unscored} of {} rows have no score", rows.len());
        }

        ResultTable {
            source: source.to_string(),
            family_id: family_id.to_string(),
            metadata,
            rows,
        }
    }
}
