use crate::config::OutputConfig;
use crate::rules::time_codec::{format_optional, format_percent};
use crate::types::*;
use anyhow::{anyhow, Result};
use std::io::{self, Write};
use std::path::Path;

const UTF8_BOM: &str = "\u{feff}";

/// Column labels, in output order.
pub const CSV_HEADER: [&str; 12] = [
    "Date",
    "Lieu",
    "Type de compétition",
    "Rang",
    "Dossard",
    "Nom",
    "Année",
    "Club",
    "Temps",
    "Temps (secondes)",
    "Écart",
    "Note",
];

impl OutputRow {
    /// The row as output fields, in `CSV_HEADER` order. Missing numbers are
    /// empty fields.
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.metadata.date.clone(),
            self.metadata.venue.clone(),
            self.metadata.competition_type.clone(),
            self.record.rank.clone(),
            self.record.bib_number.clone(),
            self.record.name.clone(),
            self.record.birth_year.clone(),
            self.record.club.clone(),
            self.record.raw_time.clone(),
            format_optional(self.derived.elapsed_seconds),
            self.record.raw_gap.clone(),
            self.derived.score_percent.map(format_percent).unwrap_or_default(),
        ]
    }
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one delimited row, quoting fields that need it. CRLF terminated.
pub fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S], sep: char) -> io::Result<()> {
    for (index, cell) in row.iter().enumerate() {
        if index > 0 {
            write!(w, "{sep}")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}

impl ResultTable {
    /// Header row then one row per competitor.
    pub fn write_csv<W: Write>(&self, w: &mut W, output: &OutputConfig) -> io::Result<()> {
        if output.write_bom {
            w.write_all(UTF8_BOM.as_bytes())?;
        }
        write_row(w, &CSV_HEADER, output.delimiter)?;
        for row in &self.rows {
            write_row(w, &row.to_fields(), output.delimiter)?;
        }
        Ok(())
    }

    pub fn to_csv_string(&self, output: &OutputConfig) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer, output)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn save_to_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize result table: {}", e))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn save_with_format(&self, path: &Path, output: &OutputConfig) -> Result<()> {
        match output.format.as_str() {
            "json" => self.save_to_json(path)?,
            "csv" => {
                let file = std::fs::File::create(path)?;
                let mut writer = io::BufWriter::new(file);
                self.write_csv(&mut writer, output)?;
                writer.flush()?;
            }
            other => return Err(anyhow!("Unknown output format '{}'", other)),
        }
        log::debug!("wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

/// File extension for an output format.
pub fn extension_for(format: &str) -> &'static str {
    match format {
        "json" => "json",
        _ => "csv",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::builder::assemble;

    fn table() -> ResultTable {
        let metadata = CompetitionMetadata {
            date: "Dimanche 1/18/2026".to_string(),
            venue: "STONEHAM".to_string(),
            competition_type: "GRANDS CIRCUITS SLALOM 1 - SLALOM FÉMININ".to_string(),
            start_time: "9:30".to_string(),
        };
        let records = vec![
            ResultRecord {
                rank: "1".to_string(),
                bib_number: "101".to_string(),
                name: "DUPONT JEAN".to_string(),
                birth_year: "2014".to_string(),
                category: 'B',
                club: "CLUB".to_string(),
                raw_time: "36,12".to_string(),
                raw_gap: "0,00".to_string(),
            },
            ResultRecord {
                rank: "2".to_string(),
                bib_number: "7".to_string(),
                name: "ROY; SAM".to_string(),
                birth_year: "2014".to_string(),
                category: 'A',
                club: "MSA".to_string(),
                raw_time: "1:02,92".to_string(),
                raw_gap: "25,34".to_string(),
            },
            ResultRecord {
                rank: "3".to_string(),
                bib_number: "9".to_string(),
                name: "CARON ZOE".to_string(),
                birth_year: "2015".to_string(),
                category: 'A',
                club: "MSA".to_string(),
                raw_time: "1:2:3".to_string(),
                raw_gap: "0,00".to_string(),
            },
        ];
        ResultTable {
            source: "sheet.pdf".to_string(),
            family_id: "u12-slalom".to_string(),
            rows: assemble(&metadata, &records),
            metadata,
        }
    }

    fn no_bom() -> OutputConfig {
        OutputConfig {
            write_bom: false,
            ..OutputConfig::default()
        }
    }

    #[test]
    fn csv_has_header_and_formatted_numbers() {
        let csv = table().to_csv_string(&no_bom()).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(
            lines[0],
            "Date;Lieu;Type de compétition;Rang;Dossard;Nom;Année;Club;Temps;Temps (secondes);Écart;Note"
        );
        assert_eq!(
            lines[1],
            "Dimanche 1/18/2026;STONEHAM;GRANDS CIRCUITS SLALOM 1 - SLALOM FÉMININ;1;101;DUPONT JEAN;2014;CLUB;36,12;36,12;0,00;100,00%"
        );
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "");
    }

    #[test]
    fn delimiter_in_field_is_quoted() {
        let csv = table().to_csv_string(&no_bom()).unwrap();
        let line = csv.split("\r\n").nth(2).unwrap();
        assert!(line.contains(";\"ROY; SAM\";"), "got {line}");
        assert!(line.ends_with(";1:02,92;62,92;25,34;59,73%"), "got {line}");
    }

    #[test]
    fn unparseable_time_renders_empty_fields() {
        let csv = table().to_csv_string(&no_bom()).unwrap();
        let line = csv.split("\r\n").nth(3).unwrap();
        assert!(line.ends_with(";1:2:3;;0,00;"), "got {line}");
    }

    #[test]
    fn bom_is_written_by_default() {
        let csv = table().to_csv_string(&OutputConfig::default()).unwrap();
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv[UTF8_BOM.len()..].starts_with("Date;"));
    }

    #[test]
    fn custom_delimiter() {
        let output = OutputConfig {
            delimiter: '\t',
            write_bom: false,
            ..OutputConfig::default()
        };
        let csv = table().to_csv_string(&output).unwrap();
        assert!(csv.starts_with("Date\tLieu\t"));
        assert!(csv.contains("\tROY; SAM\t"));
    }

    #[test]
    fn save_json_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.json");
        let output = OutputConfig {
            format: "json".to_string(),
            ..OutputConfig::default()
        };
        table().save_with_format(&path, &output).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let rows = value["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["name"], "DUPONT JEAN");
        assert_eq!(rows[0]["venue"], "STONEHAM");
        assert_eq!(rows[0]["score_percent"], 100.0);
        assert!(rows[2]["elapsed_seconds"].is_null());
    }

    #[test]
    fn unknown_format_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            format: "xlsx".to_string(),
            ..OutputConfig::default()
        };
        assert!(table()
            .save_with_format(&dir.path().join("sheet.xlsx"), &output)
            .is_err());
        assert_eq!(extension_for("json"), "json");
        assert_eq!(extension_for("csv"), "csv");
    }
}
