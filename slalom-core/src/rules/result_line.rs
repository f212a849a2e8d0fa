//! The result-line grammar.
//!
//! One competitor per line, whitespace separated, anchored on both ends:
//!
//! ```text
//! rank  bib  name...  20YY  [A-D]  CLUB  <age tag>  time  [gap]
//! 1     101  DUPONT JEAN  2014  B  CLUB  U12  36,12  0,00
//! ```
//!
//! The name is a lazy capture that ends at the first position where the rest
//! of the line matches the fixed tail (year, category, club, tag, time, gap).
//! Because the tail is anchored to the end of the line, a year-like token
//! inside a name (`EQUIPE 2000 DUBOIS`) is only taken as the birth year when
//! everything after it also forms a complete tail.
//!
//! Known failure modes, by construction of the grammar:
//! - a name whose own last words read `20YY [A-D] CODE <tag>` is split there;
//! - clubs with digits, accents or lowercase letters never match;
//! - a missing or different age tag rejects the line (a family with an
//!   empty tag expects no tag column at all).
//!
//! Lines that do not match produce no record and no error.

use crate::config::DocumentFamily;
use crate::error::ConfigError;
use crate::rules::time_codec::normalize_separator;
use crate::types::ResultRecord;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct ResultLineParser {
    line_regex: Regex,
    zero_gap: String,
}

impl ResultLineParser {
    pub fn new(family: &DocumentFamily) -> Result<Self, ConfigError> {
        // A family without an age tag has no tag column at all
        let tag = match family.age_group_tag.trim() {
            "" => String::new(),
            tag => format!(r"\s+{}", regex::escape(tag)),
        };
        let pattern = format!(
            r"^\s*(?P<rank>\d+)\s+(?P<bib>\d+)\s+(?P<name>.+?)\s+(?P<year>20\d{{2}})\s+(?P<category>[A-D])\s+(?P<club>[A-Z]+){tag}\s+(?P<time>[\d:,.]+)(?:\s+(?P<gap>[\d:,.]+))?\s*$"
        );
        let line_regex = Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
            family: family.id.clone(),
            field: "result line",
            pattern,
            source,
        })?;

        Ok(Self {
            line_regex,
            zero_gap: family.zero_gap.clone(),
        })
    }

    /// Decode one line, or `None` if it is not a result line.
    pub fn parse_line(&self, line: &str) -> Option<ResultRecord> {
        let caps = self.line_regex.captures(line)?;

        let gap = caps
            .name("gap")
            .map(|m| m.as_str())
            .unwrap_or(&self.zero_gap);

        Some(ResultRecord {
            rank: caps["rank"].to_string(),
            bib_number: caps["bib"].to_string(),
            name: caps["name"].trim().to_string(),
            birth_year: caps["year"].to_string(),
            category: caps["category"].chars().next()?,
            club: caps["club"].to_string(),
            raw_time: normalize_separator(&caps["time"]),
            raw_gap: normalize_separator(gap),
        })
    }

    /// Every result line of `text`, in the order they appear.
    pub fn parse_results(&self, text: &str) -> Vec<ResultRecord> {
        let records: Vec<ResultRecord> = text
            .lines()
            .filter_map(|line| self.parse_line(line))
            .collect();
        log::debug!(
            "result grammar matched {} of {} lines",
            records.len(),
            text.lines().count()
        );
        records
    }

    pub fn count_matches(&self, text: &str) -> usize {
        text.lines().filter(|line| self.line_regex.is_match(line)).count()
    }
}
