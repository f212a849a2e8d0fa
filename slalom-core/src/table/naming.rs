//! Output file names built from header metadata.
//!
//! `<Venue>_<YYYY-MM-DD>_Slalom<N>[_F|_M].<ext>`, e.g.
//! `Stoneham_2026-01-18_Slalom1_F.csv`. Every piece has a fallback so a
//! sheet with an empty header still gets a usable name.

use crate::types::CompetitionMetadata;
use regex::Regex;
use std::sync::LazyLock;

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap());

static SLALOM_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SLALOM\s+(\d+)").unwrap());

static GENDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SLALOM\s+(F[EÉ]MININ|MASCULIN|M[AÂ]LE)").unwrap());

static FORBIDDEN_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"|?*]"#).unwrap());

/// "STONEHAM" -> "Stoneham", "MONT-SAINTE-ANNE" -> "Mont-Sainte-Anne".
/// Empty venue -> "Course".
fn venue_label(venue: &str) -> String {
    if venue.trim().is_empty() {
        return "Course".to_string();
    }

    let mut label = String::with_capacity(venue.len());
    let mut start_of_word = true;
    for c in venue.trim().chars() {
        if c.is_alphabetic() {
            if start_of_word {
                label.extend(c.to_uppercase());
            } else {
                label.extend(c.to_lowercase());
            }
            start_of_word = false;
        } else {
            label.push(c);
            start_of_word = true;
        }
    }
    label
}

/// Sheets print the date month-first: "1/18/2026" -> "2026-01-18".
fn iso_date(date: &str) -> String {
    match DATE_REGEX.captures(date) {
        Some(caps) => format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[1], &caps[2]),
        None => "date_inconnue".to_string(),
    }
}

fn slalom_label(competition_type: &str) -> String {
    match SLALOM_NUMBER_REGEX.captures(competition_type) {
        Some(caps) => format!("Slalom{}", &caps[1]),
        None => "Slalom".to_string(),
    }
}

fn gender_suffix(competition_type: &str) -> Option<&'static str> {
    let caps = GENDER_REGEX.captures(competition_type)?;
    if caps[1].starts_with('F') {
        Some("F")
    } else {
        Some("M")
    }
}

/// `/` and `:` become `-`, spaces become `_`, and `<>"|?*` are dropped.
pub fn sanitize_file_name(name: &str) -> String {
    let name = name.replace(['/', ':'], "-").replace(' ', "_");
    FORBIDDEN_CHARS_REGEX.replace_all(&name, "").into_owned()
}

pub fn output_file_name(metadata: &CompetitionMetadata, extension: &str) -> String {
    let mut name = format!(
        "{}_{}_{}",
        venue_label(&metadata.venue),
        iso_date(&metadata.date),
        slalom_label(&metadata.competition_type)
    );
    if let Some(suffix) = gender_suffix(&metadata.competition_type) {
        name.push('_');
        name.push_str(suffix);
    }
    format!("{}.{}", sanitize_file_name(&name), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(venue: &str, date: &str, competition_type: &str) -> CompetitionMetadata {
        CompetitionMetadata {
            date: date.to_string(),
            venue: venue.to_string(),
            competition_type: competition_type.to_string(),
            start_time: String::new(),
        }
    }

    #[test]
    fn full_header() {
        let m = metadata(
            "STONEHAM",
            "Dimanche 1/18/2026",
            "GRANDS CIRCUITS SLALOM 1 - SLALOM FÉMININ",
        );
        assert_eq!(output_file_name(&m, "csv"), "Stoneham_2026-01-18_Slalom1_F.csv");
    }

    #[test]
    fn masculine_and_unaccented_variants() {
        let m = metadata("STONEHAM", "Samedi 2/7/2026", "GRANDS CIRCUITS SLALOM 2 - SLALOM MASCULIN");
        assert_eq!(output_file_name(&m, "json"), "Stoneham_2026-02-07_Slalom2_M.json");

        let m = metadata("STONEHAM", "", "GRANDS CIRCUITS SLALOM 3 - SLALOM FEMININ");
        assert_eq!(output_file_name(&m, "csv"), "Stoneham_date_inconnue_Slalom3_F.csv");
    }

    #[test]
    fn empty_header_uses_fallbacks() {
        let m = CompetitionMetadata::default();
        assert_eq!(output_file_name(&m, "csv"), "Course_date_inconnue_Slalom.csv");
    }

    #[test]
    fn multi_word_venue() {
        let m = metadata("MONT SAINTE-ANNE", "", "");
        assert_eq!(output_file_name(&m, "csv"), "Mont_Sainte-Anne_date_inconnue_Slalom.csv");
    }

    #[test]
    fn sanitizes_forbidden_characters() {
        assert_eq!(sanitize_file_name("a/b:c d<e>\"f|g?h*"), "a-b-c_defgh");
    }
}
