//! Crescent timekeeping export.
//!
//! Header names drift between file revisions, so columns are found through
//! the rule table in [`CrescentOptions::header_rules`]. Crescent carries no
//! reliable employee name; the EID is embedded in the badge string.

use laborrecon_io::Grid;
use regex::Regex;

use crate::aggregate::aggregate_records;
use crate::error::ReconError;
use crate::hours::Hours;
use crate::model::{EmployeeRecord, SourceKind};
use crate::normalize::{normalize_eid, read_hours, HoursCell, IdentifierPolicy};
use crate::source::{header_row, resolve_columns, HeaderRule};

pub const DEFAULT_HOURS_COLUMNS: [&str; 4] = ["payable hours", "payable_hours", "hours", "total hours"];
pub const DEFAULT_BADGE_CONTAINS: &str = "badge";
pub const DEFAULT_LINE_CONTAINS: &str = "line";
pub const DEFAULT_BADGE_PREFIX: &str = "PLX";

const BADGE: &str = "badge";
const HOURS: &str = "hours";
const LINE: &str = "line";

#[derive(Debug, Clone)]
pub struct CrescentOptions {
    /// Accepted hours headers, tried in order (case/whitespace-insensitive).
    pub hours_columns: Vec<String>,
    pub badge_contains: String,
    pub line_contains: String,
    /// Literal before the digit run in `<prefix>-<digits>-<suffix>`.
    pub badge_prefix: String,
    pub identifiers: IdentifierPolicy,
}

impl Default for CrescentOptions {
    fn default() -> Self {
        Self {
            hours_columns: DEFAULT_HOURS_COLUMNS.iter().map(|s| s.to_string()).collect(),
            badge_contains: DEFAULT_BADGE_CONTAINS.to_string(),
            line_contains: DEFAULT_LINE_CONTAINS.to_string(),
            badge_prefix: DEFAULT_BADGE_PREFIX.to_string(),
            identifiers: IdentifierPolicy::default(),
        }
    }
}

impl CrescentOptions {
    pub fn header_rules(&self) -> Vec<HeaderRule> {
        vec![
            HeaderRule::exact(HOURS, &self.hours_columns, true),
            HeaderRule::contains(BADGE, &self.badge_contains, true),
            HeaderRule::contains(LINE, &self.line_contains, false),
        ]
    }
}

/// Badge grammar `<prefix>-<digits>-<alphanumeric suffix>`.
#[derive(Debug, Clone)]
pub struct BadgeGrammar {
    pattern: Regex,
}

impl BadgeGrammar {
    pub fn new(prefix: &str) -> Result<Self, ReconError> {
        let pattern = Regex::new(&format!(r"{}-(\d+)-[A-Za-z0-9]+", regex::escape(prefix)))
            .map_err(|e| ReconError::ConfigValidation(format!("badge prefix '{prefix}': {e}")))?;
        Ok(Self { pattern })
    }

    /// The raw digit run between the literal markers, before normalization.
    pub fn extract<'a>(&self, badge: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(badge)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Parsed records plus the rows excluded for an unusable badge.
#[derive(Debug)]
pub struct CrescentReport {
    pub records: Vec<EmployeeRecord>,
    /// `ReconError::MalformedIdentifier` per excluded row.
    pub rejected: Vec<ReconError>,
}

/// Decode and parse a Crescent export (CSV/TSV or workbook).
pub fn parse_crescent_source(
    bytes: &[u8],
    options: &CrescentOptions,
) -> Result<Vec<EmployeeRecord>, ReconError> {
    Ok(parse_crescent_report(bytes, options)?.records)
}

pub fn parse_crescent_report(bytes: &[u8], options: &CrescentOptions) -> Result<CrescentReport, ReconError> {
    let grid = laborrecon_io::read_grid(bytes)?;
    parse_crescent_grid(&grid, options)
}

pub fn parse_crescent_grid(grid: &Grid, options: &CrescentOptions) -> Result<CrescentReport, ReconError> {
    let headers = header_row(grid, 0).unwrap_or_default();
    let columns = resolve_columns(SourceKind::Crescent, &headers, &options.header_rules())?;
    let missing = || ReconError::MissingColumn {
        vendor: SourceKind::Crescent,
        found: headers.iter().filter(|h| !h.is_empty()).cloned().collect(),
        required: vec![HOURS.to_string(), BADGE.to_string()],
    };
    let hours_col = columns.get(HOURS).ok_or_else(missing)?;
    let badge_col = columns.get(BADGE).ok_or_else(missing)?;
    let line_col = columns.get(LINE);

    let grammar = BadgeGrammar::new(&options.badge_prefix)?;

    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (row_idx, row) in grid.rows().enumerate().skip(1) {
        if row.iter().all(|c| c.is_blank()) {
            continue;
        }

        let badge = grid.cell(row_idx, badge_col).as_text().trim().to_string();
        let eid = grammar
            .extract(&badge)
            .map(|raw| normalize_eid(raw, options.identifiers))
            .unwrap_or_default();
        if eid.is_empty() {
            log::warn!("Crescent row {}: badge '{}' has no usable EID", row_idx + 1, badge);
            rejected.push(ReconError::MalformedIdentifier { row: row_idx + 1, value: badge });
            continue;
        }

        let hours_cell = grid.cell(row_idx, hours_col);
        let mut record = EmployeeRecord::new(eid, "", Hours::ZERO).with_badge(badge);
        match read_hours(hours_cell) {
            HoursCell::Value(h) => record.total_hours = h,
            HoursCell::Blank | HoursCell::Invalid => {
                log::warn!(
                    "Crescent row {}: unusable hours '{}', counted as 0",
                    row_idx + 1,
                    hours_cell.as_text()
                );
                record.invalid_hours = true;
            }
        }

        if let Some(col) = line_col {
            let line = grid.cell(row_idx, col).as_text().trim().to_string();
            if !line.is_empty() {
                record.lines.insert(line);
            }
        }

        records.push(record);
    }

    let kept = records.len();
    let records = aggregate_records(records);
    log::debug!(
        "Crescent: {} rows kept ({} employees), {} rejected",
        kept,
        records.len(),
        rejected.len()
    );
    Ok(CrescentReport { records, rejected })
}
