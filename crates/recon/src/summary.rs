//! Client-facing discrepancy text.
//!
//! The line template is a compatibility contract with the emails operators
//! already send; do not change wording or punctuation.

use crate::hours::Hours;
use crate::model::{ReconciledRow, Resolution};

const UNKNOWN_NAME: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

/// One line per non-`Match` row, newline-joined in row order.
pub fn summarize(rows: &[ReconciledRow]) -> String {
    render(rows.iter().filter(|r| r.discrepancy.is_discrepancy()))
}

/// Like [`summarize`], but also drops rows the operator marked resolved.
pub fn summarize_unresolved(rows: &[ReconciledRow]) -> String {
    render(
        rows.iter()
            .filter(|r| r.discrepancy.is_discrepancy() && r.resolution != Resolution::Resolved),
    )
}

pub fn summary_line(row: &ReconciledRow) -> String {
    format!(
        "{} - Worked Line {} for {} (correct), not {} (incorrect). [{}]",
        row.display_name().unwrap_or(UNKNOWN_NAME),
        row.lines.as_deref().unwrap_or(NOT_AVAILABLE),
        hours_or_na(row.total_hours_plx),
        hours_or_na(row.total_hours_crescent),
        row.badge.as_deref().unwrap_or(NOT_AVAILABLE),
    )
}

fn hours_or_na(hours: Option<Hours>) -> String {
    hours.map_or_else(|| NOT_AVAILABLE.to_string(), |h| h.to_string())
}

fn render<'a>(rows: impl Iterator<Item = &'a ReconciledRow>) -> String {
    rows.map(summary_line).collect::<Vec<_>>().join("\n")
}
