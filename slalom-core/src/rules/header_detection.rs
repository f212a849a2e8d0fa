use crate::config::DocumentFamily;
use crate::error::ConfigError;
use crate::types::CompetitionMetadata;
use regex::Regex;

// HeaderExtractor - four independent best-effort scans over the whole text.
// None of them reads another's result, so they can run in any order.
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    /// `None` when the family lists no weekday names
    date_regex: Option<Regex>,
    venues: Vec<String>,
    competition_regex: Regex,
    discipline_regex: Regex,
    start_time_regex: Regex,
}

fn compile(family: &DocumentFamily, field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        family: family.id.clone(),
        field,
        pattern: pattern.to_string(),
        source,
    })
}

impl HeaderExtractor {
    pub fn new(family: &DocumentFamily) -> Result<Self, ConfigError> {
        let date_regex = if family.weekdays.is_empty() {
            None
        } else {
            let weekdays = family
                .weekdays
                .iter()
                .map(|day| regex::escape(day))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"({weekdays})\s+(\d{{1,2}}/\d{{1,2}}/\d{{4}})");
            Some(compile(family, "date", &pattern)?)
        };

        let start_time_pattern = format!(
            r"{}[:\s]+(\d{{1,2}}:\d{{2}})",
            regex::escape(&family.start_time_label)
        );

        Ok(Self {
            date_regex,
            venues: family.venues.clone(),
            competition_regex: compile(family, "competition", &family.competition_pattern)?,
            discipline_regex: compile(family, "discipline", &family.discipline_pattern)?,
            start_time_regex: compile(family, "start time", &start_time_pattern)?,
        })
    }

    pub fn extract(&self, text: &str) -> CompetitionMetadata {
        let metadata = CompetitionMetadata {
            date: self.extract_date(text),
            venue: self.extract_venue(text),
            competition_type: self.extract_competition_type(text),
            start_time: self.extract_start_time(text),
        };
        log::debug!("header metadata: {metadata:?}");
        metadata
    }

    /// "<weekday> <D/D/YYYY>", or empty
    pub fn extract_date(&self, text: &str) -> String {
        self.date_regex
            .as_ref()
            .and_then(|re| re.captures(text))
            .map(|caps| format!("{} {}", &caps[1], &caps[2]))
            .unwrap_or_default()
    }

    /// First configured venue appearing verbatim, or empty
    pub fn extract_venue(&self, text: &str) -> String {
        self.venues
            .iter()
            .find(|venue| text.contains(venue.as_str()))
            .cloned()
            .unwrap_or_default()
    }

    /// Both patterns or nothing: a lone match is treated as noise.
    pub fn extract_competition_type(&self, text: &str) -> String {
        match (
            self.competition_regex.find(text),
            self.discipline_regex.find(text),
        ) {
            (Some(competition), Some(discipline)) => {
                format!("{} - {}", competition.as_str(), discipline.as_str())
            }
            _ => String::new(),
        }
    }

    /// H:MM after the start-time label, or empty
    pub fn extract_start_time(&self, text: &str) -> String {
        self.start_time_regex
            .captures(text)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default()
    }
}
