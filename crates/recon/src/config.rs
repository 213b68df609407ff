use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::alias::AliasMap;
use crate::edit::RecordEdit;
use crate::engine::{validate_tolerance, DEFAULT_TOLERANCE};
use crate::error::ReconError;
use crate::model::Resolution;
use crate::normalize::IdentifierPolicy;
use crate::source::crescent::{
    CrescentOptions, DEFAULT_BADGE_CONTAINS, DEFAULT_BADGE_PREFIX, DEFAULT_HOURS_COLUMNS,
    DEFAULT_LINE_CONTAINS,
};
use crate::source::plx::{
    DayFilter, PlxOptions, DEFAULT_HEADER_ROW, DEFAULT_HOUR_PATTERNS, DEFAULT_ID_COLUMN,
    DEFAULT_NAME_COLUMN,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// One review session: two exports plus the operator's merges, edits and notes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Drop PLX associates with zero total hours before reconciling.
    #[serde(default)]
    pub hide_zero_hours: bool,
    #[serde(default)]
    pub day: DayFilter,
    #[serde(default)]
    pub strip_leading_zeros: bool,
    pub plx: PlxSection,
    pub crescent: CrescentSection,
    #[serde(default)]
    pub merges: Vec<MergeConfig>,
    #[serde(default)]
    pub edits: Vec<RecordEdit>,
    #[serde(default)]
    pub review: Vec<ReviewEntry>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlxSection {
    pub file: String,
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    #[serde(default = "default_hour_patterns")]
    pub hour_patterns: Vec<String>,
}

fn default_header_row() -> usize {
    DEFAULT_HEADER_ROW
}

fn default_id_column() -> String {
    DEFAULT_ID_COLUMN.to_string()
}

fn default_name_column() -> String {
    DEFAULT_NAME_COLUMN.to_string()
}

fn default_hour_patterns() -> Vec<String> {
    DEFAULT_HOUR_PATTERNS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrescentSection {
    pub file: String,
    #[serde(default = "default_hours_columns")]
    pub hours_columns: Vec<String>,
    #[serde(default = "default_badge_contains")]
    pub badge_contains: String,
    #[serde(default = "default_line_contains")]
    pub line_contains: String,
    #[serde(default = "default_badge_prefix")]
    pub badge_prefix: String,
}

fn default_hours_columns() -> Vec<String> {
    DEFAULT_HOURS_COLUMNS.iter().map(|s| s.to_string()).collect()
}

fn default_badge_contains() -> String {
    DEFAULT_BADGE_CONTAINS.to_string()
}

fn default_line_contains() -> String {
    DEFAULT_LINE_CONTAINS.to_string()
}

fn default_badge_prefix() -> String {
    DEFAULT_BADGE_PREFIX.to_string()
}

// ---------------------------------------------------------------------------
// Operator state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    pub ids: Vec<String>,
    pub into: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewEntry {
    pub eid: String,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SessionConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: SessionConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        validate_tolerance(self.tolerance)?;

        if self.plx.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation("plx.file is empty".into()));
        }
        if self.crescent.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation("crescent.file is empty".into()));
        }
        if self.plx.header_row == 0 {
            return Err(ReconError::ConfigValidation(
                "plx.header_row is 1-based, got 0".into(),
            ));
        }
        if self.plx.hour_patterns.is_empty() || self.plx.hour_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "plx.hour_patterns must be non-empty column patterns".into(),
            ));
        }
        if self.crescent.hours_columns.is_empty()
            || self.crescent.hours_columns.iter().any(|p| p.trim().is_empty())
        {
            return Err(ReconError::ConfigValidation(
                "crescent.hours_columns must be non-empty header names".into(),
            ));
        }
        if self.crescent.badge_contains.trim().is_empty() {
            return Err(ReconError::ConfigValidation("crescent.badge_contains is empty".into()));
        }
        if self.crescent.badge_prefix.trim().is_empty() {
            return Err(ReconError::ConfigValidation("crescent.badge_prefix is empty".into()));
        }

        // Replay merges on a scratch map so a bad entry is reported up front.
        self.alias_map()?;

        for edit in &self.edits {
            edit.validate()?;
        }
        for (i, entry) in self.review.iter().enumerate() {
            if entry.eid.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "review entry {} has an empty eid",
                    i + 1
                )));
            }
        }

        Ok(())
    }

    pub fn identifiers(&self) -> IdentifierPolicy {
        IdentifierPolicy {
            strip_leading_zeros: self.strip_leading_zeros,
        }
    }

    pub fn plx_options(&self) -> PlxOptions {
        PlxOptions {
            header_row: self.plx.header_row,
            id_column: self.plx.id_column.clone(),
            name_column: self.plx.name_column.clone(),
            hour_patterns: self.plx.hour_patterns.clone(),
            day: self.day,
            identifiers: self.identifiers(),
        }
    }

    pub fn crescent_options(&self) -> CrescentOptions {
        CrescentOptions {
            hours_columns: self.crescent.hours_columns.clone(),
            badge_contains: self.crescent.badge_contains.clone(),
            line_contains: self.crescent.line_contains.clone(),
            badge_prefix: self.crescent.badge_prefix.trim().to_string(),
            identifiers: self.identifiers(),
        }
    }

    /// Alias map built by replaying `[[merges]]` in file order.
    pub fn alias_map(&self) -> Result<AliasMap, ReconError> {
        let mut map = AliasMap::new();
        for merge in &self.merges {
            map.merge_identifiers(merge.ids.as_slice(), &merge.into)?;
        }
        Ok(map)
    }

    /// Source paths, resolved against the directory holding the session file.
    pub fn plx_path(&self, base: &Path) -> PathBuf {
        base.join(&self.plx.file)
    }

    pub fn crescent_path(&self, base: &Path) -> PathBuf {
        base.join(&self.crescent.file)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceKind;
    use chrono::Weekday;

    const MINIMAL: &str = r#"
[plx]
file = "plx.xlsx"

[crescent]
file = "crescent.csv"
"#;

    #[test]
    fn minimal_session_takes_defaults() {
        let config = SessionConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert!(!config.hide_zero_hours);
        assert_eq!(config.day, DayFilter::All);

        let plx = config.plx_options();
        assert_eq!(plx.header_row, 5);
        assert_eq!(plx.id_column, "File");
        assert_eq!(plx.hour_patterns, vec!["Reg Hrs", "OT Hrs", "DT Hrs"]);

        let crescent = config.crescent_options();
        assert_eq!(crescent.hours_columns.len(), 4);
        assert_eq!(crescent.badge_prefix, "PLX");
        assert!(config.alias_map().unwrap().is_empty());
    }

    #[test]
    fn full_session() {
        let input = r#"
name = "Week 41"
tolerance = 0.25
hide_zero_hours = true
day = "Wednesday"
strip_leading_zeros = true

[plx]
file = "in/plx.xlsx"
header_row = 3
id_column = "Emp #"

[crescent]
file = "in/crescent.csv"
hours_columns = ["worked"]

[[merges]]
ids = ["111", "222"]
into = "111"

[[edits]]
source = "crescent"
eid = "333"
hours = 8.0

[[review]]
eid = "111"
resolution = "crescent_error"
notes = "badge swapped"
"#;
        let config = SessionConfig::from_toml(input).unwrap();
        assert_eq!(config.name, "Week 41");
        assert_eq!(config.day, DayFilter::Only(Weekday::Wed));
        assert!(config.plx_options().identifiers.strip_leading_zeros);
        assert!(config.crescent_options().identifiers.strip_leading_zeros);
        assert_eq!(config.plx_options().header_row, 3);
        assert_eq!(config.alias_map().unwrap().resolve("222"), "111");
        assert_eq!(config.edits[0].source, SourceKind::Crescent);
        assert_eq!(config.review[0].resolution, Resolution::CrescentError);
        assert_eq!(
            config.plx_path(Path::new("/data")),
            PathBuf::from("/data/in/plx.xlsx")
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let input = format!("tolerence = 0.5\n{MINIMAL}");
        assert!(matches!(
            SessionConfig::from_toml(&input),
            Err(ReconError::ConfigParse(_))
        ));
    }

    #[test]
    fn rejects_bad_day() {
        let input = format!("day = \"Funday\"\n{MINIMAL}");
        assert!(SessionConfig::from_toml(&input).is_err());
    }

    #[test]
    fn rejects_negative_tolerance() {
        let input = format!("tolerance = -1.0\n{MINIMAL}");
        assert!(matches!(
            SessionConfig::from_toml(&input),
            Err(ReconError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn rejects_degenerate_merge() {
        let input = format!("{MINIMAL}\n[[merges]]\nids = [\"111\"]\ninto = \"111\"\n");
        assert!(matches!(
            SessionConfig::from_toml(&input),
            Err(ReconError::InvalidMergeRequest(_))
        ));
    }

    #[test]
    fn rejects_negative_edit() {
        let input = format!("{MINIMAL}\n[[edits]]\nsource = \"plx\"\neid = \"1\"\nhours = -2.0\n");
        assert!(matches!(
            SessionConfig::from_toml(&input),
            Err(ReconError::InvalidEdit { .. })
        ));
    }

    #[test]
    fn rejects_misspelled_edit_field() {
        let input = format!("{MINIMAL}\n[[edits]]\nsource = \"plx\"\neid = \"1\"\nhour = 8.0\n");
        match SessionConfig::from_toml(&input) {
            Err(ReconError::ConfigParse(msg)) => assert!(msg.contains("hour"), "{msg}"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_edit_without_changes() {
        let input = format!("{MINIMAL}\n[[edits]]\nsource = \"crescent\"\neid = \"333\"\n");
        assert!(matches!(
            SessionConfig::from_toml(&input),
            Err(ReconError::InvalidEdit { eid, .. }) if eid == "333"
        ));
    }

    #[test]
    fn rejects_zero_header_row() {
        let input = MINIMAL.replace("file = \"plx.xlsx\"", "file = \"plx.xlsx\"\nheader_row = 0");
        assert!(matches!(
            SessionConfig::from_toml(&input),
            Err(ReconError::ConfigValidation(_))
        ));
    }
}
