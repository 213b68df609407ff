//! Vendor export parsers.
//!
//! Each parser turns a decoded [`Grid`] into one [`EmployeeRecord`] per
//! canonical EID. Header lookup is table-driven: every logical field has an
//! ordered list of [`HeaderPattern`]s and the first pattern that hits a header
//! wins. New vendor header variants are added to the tables, not to the
//! parsing code.
//!
//! [`EmployeeRecord`]: crate::model::EmployeeRecord

pub mod crescent;
pub mod plx;

use std::collections::HashMap;

use laborrecon_io::Grid;

use crate::error::ReconError;
use crate::model::SourceKind;

/// One way a header may spell a logical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPattern {
    /// Whole header equals the pattern.
    Exact(String),
    /// Header contains the pattern.
    Contains(String),
}

impl HeaderPattern {
    fn matches(&self, header: &str) -> bool {
        match self {
            HeaderPattern::Exact(p) => header == p,
            HeaderPattern::Contains(p) => header.contains(p.as_str()),
        }
    }
}

/// Ordered patterns for one logical field.
#[derive(Debug, Clone)]
pub struct HeaderRule {
    pub field: &'static str,
    pub patterns: Vec<HeaderPattern>,
    pub required: bool,
}

impl HeaderRule {
    pub fn exact<S: AsRef<str>>(field: &'static str, names: &[S], required: bool) -> Self {
        Self {
            field,
            patterns: names
                .iter()
                .map(|n| HeaderPattern::Exact(normalize_header(n.as_ref())))
                .collect(),
            required,
        }
    }

    pub fn contains(field: &'static str, needle: &str, required: bool) -> Self {
        Self {
            field,
            patterns: vec![HeaderPattern::Contains(normalize_header(needle))],
            required,
        }
    }
}

/// Header lookup key: trimmed, lowercased, inner whitespace collapsed.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Field name → column index, resolved once per parse.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<&'static str, usize>,
}

impl ColumnMap {
    pub fn get(&self, field: &str) -> Option<usize> {
        self.columns.get(field).copied()
    }
}

/// Resolve every rule against the header row, first match wins.
///
/// Patterns are tried in order; within a pattern the leftmost header wins.
/// Fails with `MissingColumn` listing every header actually present when a
/// required field has no match.
pub fn resolve_columns(
    vendor: SourceKind,
    headers: &[String],
    rules: &[HeaderRule],
) -> Result<ColumnMap, ReconError> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut map = ColumnMap::default();
    let mut missing = Vec::new();

    for rule in rules {
        let hit = rule
            .patterns
            .iter()
            .find_map(|p| normalized.iter().position(|h| !h.is_empty() && p.matches(h)));
        match hit {
            Some(idx) => {
                map.columns.insert(rule.field, idx);
            }
            None if rule.required => missing.push(rule.field.to_string()),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(ReconError::MissingColumn {
            vendor,
            found: present_headers(headers),
            required: missing,
        });
    }
    Ok(map)
}

/// Header texts of one grid row, trimmed. `None` if the row doesn't exist.
pub fn header_row(grid: &Grid, row: usize) -> Option<Vec<String>> {
    grid.row(row)
        .map(|cells| cells.iter().map(|c| c.as_text().trim().to_string()).collect())
}

fn present_headers(headers: &[String]) -> Vec<String> {
    headers.iter().filter(|h| !h.is_empty()).cloned().collect()
}
