use crate::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Family id meaning "let the classifier pick the best matching family".
pub const AUTO_FAMILY: &str = "auto";

/// Id of the built-in family (U12 slalom sheets, French locale).
pub const DEFAULT_FAMILY: &str = "u12-slalom";

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_family() -> String {
    DEFAULT_FAMILY.to_string()
}

fn default_zero_gap() -> String {
    "0,00".to_string()
}

fn default_delimiter() -> char {
    ';'
}

fn default_format() -> String {
    "csv".to_string()
}

fn default_weekdays() -> Vec<String> {
    vec![
        "Lundi".to_string(),
        "Mardi".to_string(),
        "Mercredi".to_string(),
        "Jeudi".to_string(),
        "Vendredi".to_string(),
        "Samedi".to_string(),
        "Dimanche".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Family to parse with, or "auto" to classify each document
    #[serde(default = "default_family")]
    pub family: String,
    /// Extra families on top of the built-in ones
    #[serde(default)]
    pub families: Vec<DocumentFamily>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Grammar parameters for one family of result sheets.
///
/// Everything that used to be a literal in the line grammar or the header
/// scans lives here, so a new family of documents is a config entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFamily {
    pub id: String,
    /// Literal printed between the club code and the time on every result line
    pub age_group_tag: String,
    /// Venue names searched verbatim in the text, first hit wins
    #[serde(default)]
    pub venues: Vec<String>,
    /// Weekday names that may precede the D/D/YYYY date
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<String>,
    /// Regex for "category + discipline + numeral"
    pub competition_pattern: String,
    /// Regex for "discipline + qualifier"
    pub discipline_pattern: String,
    /// Literal label preceding the H:MM start time
    pub start_time_label: String,
    /// Gap token used when a result line has no gap
    #[serde(default = "default_zero_gap")]
    pub zero_gap: String,
}

impl DocumentFamily {
    /// U12 slalom sheets as printed for the Quebec regional circuit.
    pub fn u12_slalom() -> Self {
        Self {
            id: DEFAULT_FAMILY.to_string(),
            age_group_tag: "U12".to_string(),
            venues: vec!["STONEHAM".to_string()],
            weekdays: default_weekdays(),
            competition_pattern: r"GRANDS CIRCUITS SLALOM \d+".to_string(),
            discipline_pattern: r"SLALOM [A-ZÉÈÊ]+".to_string(),
            start_time_label: "Heure de début".to_string(),
            zero_gap: default_zero_gap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// "csv" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Prefix CSV files with a UTF-8 BOM so spreadsheets pick up the encoding
    #[serde(default = "default_true")]
    pub write_bom: bool,
}

/// Formats `ResultTable::save_with_format` can write
pub const SUPPORTED_FORMATS: &[&str] = &["csv", "json"];

impl OutputConfig {
    /// Check the format before any document is read, so a typo fails the
    /// run instead of every document.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if SUPPORTED_FORMATS.contains(&self.format.as_str()) {
            Ok(())
        } else {
            Err(ConfigError::UnknownFormat(self.format.clone()))
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            delimiter: default_delimiter(),
            write_bom: true,
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            family: default_family(),
            families: Vec::new(),
            output: OutputConfig::default(),
        }
    }
}

impl ParsingConfig {
    /// Load config from file path (functional approach)
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParsingConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                log::warn!("failed to load config from {p}: {e}");
                eprintln!("⚠️  Failed to load config from {}, using defaults", p);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn is_auto_family(&self) -> bool {
        self.family == AUTO_FAMILY
    }
}

/// All known document families: built-ins first, then config-defined ones
/// in the order they were declared.
#[derive(Debug, Clone)]
pub struct FamilyRegistry {
    families: Vec<DocumentFamily>,
}

impl FamilyRegistry {
    pub fn new() -> Self {
        Self {
            families: vec![DocumentFamily::u12_slalom()],
        }
    }

    /// Built-ins plus the families declared in `config`. A config family
    /// with a built-in id replaces the built-in.
    pub fn from_config(config: &ParsingConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        let mut declared: Vec<&str> = Vec::new();
        for family in &config.families {
            if declared.contains(&family.id.as_str()) {
                return Err(ConfigError::DuplicateFamily(family.id.clone()));
            }
            declared.push(&family.id);
            registry.register(family.clone());
        }
        Ok(registry)
    }

    pub fn register(&mut self, family: DocumentFamily) {
        match self.families.iter_mut().find(|f| f.id == family.id) {
            Some(existing) => *existing = family,
            None => self.families.push(family),
        }
    }

    pub fn get(&self, id: &str) -> Result<&DocumentFamily, ConfigError> {
        self.families
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| ConfigError::UnknownFamily(id.to_string()))
    }

    pub fn families(&self) -> &[DocumentFamily] {
        &self.families
    }

    pub fn ids(&self) -> Vec<&str> {
        self.families.iter().map(|f| f.id.as_str()).collect()
    }
}

impl Default for FamilyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_builtin_family() {
        let config = ParsingConfig::default();
        let registry = FamilyRegistry::from_config(&config).unwrap();
        let family = registry.get(&config.family).unwrap();
        assert_eq!(family.age_group_tag, "U12");
        assert_eq!(family.venues, vec!["STONEHAM"]);
        assert_eq!(family.weekdays.len(), 7);
    }

    #[test]
    fn yaml_family_fills_defaults() {
        let yaml = r#"
family: u14-slalom
families:
  - id: u14-slalom
    age_group_tag: U14
    venues: [STONEHAM, "MONT-SAINTE-ANNE"]
    competition_pattern: 'COUPE \w+ SLALOM \d+'
    discipline_pattern: 'SLALOM [A-ZÉÈÊ]+'
    start_time_label: Heure de début
output:
  write_bom: false
"#;
        let config: ParsingConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.family, "u14-slalom");
        assert_eq!(config.output.delimiter, ';');
        assert!(!config.output.write_bom);

        let registry = FamilyRegistry::from_config(&config).unwrap();
        assert_eq!(registry.ids(), vec![DEFAULT_FAMILY, "u14-slalom"]);

        let family = registry.get("u14-slalom").unwrap();
        assert_eq!(family.zero_gap, "0,00");
        assert_eq!(family.weekdays[6], "Dimanche");
        assert_eq!(family.venues[1], "MONT-SAINTE-ANNE");
    }

    #[test]
    fn config_family_overrides_builtin() {
        let mut custom = DocumentFamily::u12_slalom();
        custom.venues.push("LE RELAIS".to_string());
        let config = ParsingConfig {
            families: vec![custom],
            ..ParsingConfig::default()
        };

        let registry = FamilyRegistry::from_config(&config).unwrap();
        assert_eq!(registry.families().len(), 1);
        assert_eq!(registry.get(DEFAULT_FAMILY).unwrap().venues.len(), 2);
    }

    #[test]
    fn duplicate_family_is_rejected() {
        let config = ParsingConfig {
            families: vec![DocumentFamily::u12_slalom(), DocumentFamily::u12_slalom()],
            ..ParsingConfig::default()
        };
        let err = FamilyRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateFamily(id) if id == DEFAULT_FAMILY));
    }

    #[test]
    fn unknown_family_is_an_error() {
        let registry = FamilyRegistry::new();
        assert!(matches!(
            registry.get("u16-giant"),
            Err(ConfigError::UnknownFamily(_))
        ));
    }

    #[test]
    fn missing_config_file_falls_back_to_default() {
        let config = ParsingConfig::load_with_fallback(Some("/nonexistent/slalom.yaml"));
        assert_eq!(config.family, DEFAULT_FAMILY);
        assert!(!config.is_auto_family());
    }

    #[test]
    fn output_format_is_validated() {
        assert!(OutputConfig::default().validate().is_ok());

        let json = OutputConfig {
            format: "json".to_string(),
            ..OutputConfig::default()
        };
        assert!(json.validate().is_ok());

        let typo = OutputConfig {
            format: "xlsx".to_string(),
            ..OutputConfig::default()
        };
        let err = typo.validate().unwrap_err();
        assert!(matches!(&err, ConfigError::UnknownFormat(format) if format == "xlsx"));
        assert!(err.to_string().contains("xlsx"));
    }
}
