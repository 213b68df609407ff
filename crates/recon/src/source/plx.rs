//! PLX weekly labor export.
//!
//! Layout: a few preamble rows, then the header row (5th row by default),
//! then one row per employee per department. Columns are `Dept`, `File`
//! (the employee ID), `Name`, `Bill Rate`, followed by one block per weekday
//! of `Reg Hrs`, `Reg $`, `OT Hrs`, `OT $`, `DT Hrs`, `DT $`. Blank separator
//! rows and subtotal rows (`... Total` in the ID column) are interleaved.

use std::str::FromStr;

use chrono::Weekday;
use laborrecon_io::Grid;
use serde::Deserialize;

use crate::aggregate::aggregate_records;
use crate::error::ReconError;
use crate::hours::Hours;
use crate::model::{EmployeeRecord, SourceKind};
use crate::normalize::{normalize_cell_eid, read_hours, HoursCell, IdentifierPolicy};
use crate::source::{header_row, resolve_columns, HeaderRule};

pub const DEFAULT_HEADER_ROW: usize = 5;
pub const DEFAULT_ID_COLUMN: &str = "File";
pub const DEFAULT_NAME_COLUMN: &str = "Name";
pub const DEFAULT_HOUR_PATTERNS: [&str; 3] = ["Reg Hrs", "OT Hrs", "DT Hrs"];

const SUBTOTAL_MARKER: &str = "total";

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Restrict summed hours to one weekday block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

impl DayFilter {
    fn includes(&self, day: Weekday) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Only(d) => *d == day,
        }
    }
}

impl FromStr for DayFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(DayFilter::All);
        }
        Weekday::from_str(s)
            .map(DayFilter::Only)
            .map_err(|_| format!("unknown day '{s}' (expected \"all\" or a weekday name)"))
    }
}

impl TryFrom<String> for DayFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for DayFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayFilter::All => write!(f, "all"),
            DayFilter::Only(d) => write!(f, "{d}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlxOptions {
    /// 1-based row holding the column headers.
    pub header_row: usize,
    pub id_column: String,
    pub name_column: String,
    /// Case-sensitive substrings marking hour sub-columns.
    pub hour_patterns: Vec<String>,
    pub day: DayFilter,
    pub identifiers: IdentifierPolicy,
}

impl Default for PlxOptions {
    fn default() -> Self {
        Self {
            header_row: DEFAULT_HEADER_ROW,
            id_column: DEFAULT_ID_COLUMN.to_string(),
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            hour_patterns: DEFAULT_HOUR_PATTERNS.iter().map(|s| s.to_string()).collect(),
            day: DayFilter::All,
            identifiers: IdentifierPolicy::default(),
        }
    }
}

/// Decode and parse a PLX export (xlsx/xls, or delimited text).
pub fn parse_plx_source(bytes: &[u8], options: &PlxOptions) -> Result<Vec<EmployeeRecord>, ReconError> {
    let grid = laborrecon_io::read_grid(bytes)?;
    parse_plx_grid(&grid, options)
}

pub fn parse_plx_grid(grid: &Grid, options: &PlxOptions) -> Result<Vec<EmployeeRecord>, ReconError> {
    let header_idx = options.header_row.saturating_sub(1);
    let required = vec![options.id_column.clone(), options.name_column.clone()];

    let headers = header_row(grid, header_idx).ok_or_else(|| ReconError::MissingColumn {
        vendor: SourceKind::Plx,
        found: Vec::new(),
        required: required.clone(),
    })?;

    let rules = [
        HeaderRule::exact("id", &[options.id_column.as_str()], true),
        HeaderRule::exact("name", &[options.name_column.as_str()], true),
    ];
    let missing = |found: Vec<String>| ReconError::MissingColumn {
        vendor: SourceKind::Plx,
        found,
        required: required.clone(),
    };
    let columns = resolve_columns(SourceKind::Plx, &headers, &rules).map_err(|e| match e {
        ReconError::MissingColumn { found, .. } => missing(found),
        other => other,
    })?;
    let id_col = columns.get("id").ok_or_else(|| missing(Vec::new()))?;
    let name_col = columns.get("name").ok_or_else(|| missing(Vec::new()))?;

    let hour_cols = hour_columns(&headers, &options.hour_patterns, options.day);
    if hour_cols.is_empty() {
        log::warn!(
            "PLX: no hour columns match {:?} (day filter: {})",
            options.hour_patterns,
            options.day
        );
    }

    let mut records = Vec::new();
    let (mut blank, mut subtotal, mut no_eid) = (0usize, 0usize, 0usize);

    for row_idx in header_idx + 1..grid.height() {
        let id_cell = grid.cell(row_idx, id_col);
        let name_cell = grid.cell(row_idx, name_col);

        if id_cell.is_blank() || name_cell.is_blank() {
            blank += 1;
            continue;
        }
        if id_cell.as_text().to_lowercase().contains(SUBTOTAL_MARKER) {
            subtotal += 1;
            continue;
        }

        let eid = normalize_cell_eid(id_cell, options.identifiers);
        if eid.is_empty() {
            log::debug!("PLX row {}: no digits in ID '{}'", row_idx + 1, id_cell.as_text());
            no_eid += 1;
            continue;
        }

        let mut record = EmployeeRecord::new(eid, name_cell.as_text().trim(), Hours::ZERO);
        for &col in &hour_cols {
            match read_hours(grid.cell(row_idx, col)) {
                HoursCell::Value(h) => record.total_hours += h,
                HoursCell::Blank => {}
                HoursCell::Invalid => {
                    log::warn!(
                        "PLX row {}, column '{}': non-numeric hours '{}'",
                        row_idx + 1,
                        headers[col],
                        grid.cell(row_idx, col).as_text()
                    );
                    record.invalid_hours = true;
                }
            }
        }
        records.push(record);
    }

    let kept = records.len();
    let aggregated = aggregate_records(records);
    log::debug!(
        "PLX: {} rows kept ({} employees), {} blank, {} subtotal, {} without EID",
        kept,
        aggregated.len(),
        blank,
        subtotal,
        no_eid
    );
    Ok(aggregated)
}

/// Indices of hour sub-columns that belong to the selected day(s).
///
/// A column's weekday comes from its header when the header names one;
/// otherwise from its block ordinal: the n-th column of a given hour kind
/// belongs to the n-th day of the week, Monday first.
fn hour_columns(headers: &[String], patterns: &[String], day: DayFilter) -> Vec<usize> {
    let mut seen = vec![0usize; patterns.len()];
    let mut cols = Vec::new();

    for (idx, header) in headers.iter().enumerate() {
        let Some(kind) = patterns.iter().position(|p| header.contains(p.as_str())) else {
            continue;
        };
        let ordinal = seen[kind];
        seen[kind] += 1;

        let weekday = weekday_in_header(header).unwrap_or(WEEK[ordinal % WEEK.len()]);
        if day.includes(weekday) {
            cols.push(idx);
        }
    }
    cols
}

fn weekday_in_header(header: &str) -> Option<Weekday> {
    header
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|token| token.len() >= 3)
        .find_map(|token| {
            let lower = token.to_ascii_lowercase();
            WEEK.iter().copied().find(|d| {
                let full = weekday_name(*d);
                lower == full || (lower.len() <= 5 && full.starts_with(lower.as_str()))
            })
        })
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
