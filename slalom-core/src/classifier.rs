use crate::rules::ExtractionEngine;
use crate::types::ClassificationResult;

/// Picks the document family whose result grammar matches the most lines.
pub struct DocumentClassifier;

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Ties go to the engine registered first. When no family matches any
    /// line, the first engine is returned with zero confidence so the
    /// caller still gets header metadata and an empty result set.
    ///
    /// `None` only when `engines` is empty.
    pub fn classify(&self, text: &str, engines: &[ExtractionEngine]) -> Option<ClassificationResult> {
        let counts: Vec<usize> = engines
            .iter()
            .map(|engine| engine.count_matching_lines(text))
            .collect();
        let total: usize = counts.iter().sum();

        let (best_index, best_count) = counts
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, usize)>, (index, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((index, count)),
            })?;

        let confidence = if total == 0 {
            0.0
        } else {
            best_count as f32 / total as f32
        };

        let result = ClassificationResult {
            family_id: engines[best_index].family_id().to_string(),
            matched_lines: best_count,
            confidence,
        };
        log::info!(
            "classified as {} ({} lines, confidence {:.2})",
            result.family_id,
            result.matched_lines,
            result.confidence
        );
        Some(result)
    }
}
