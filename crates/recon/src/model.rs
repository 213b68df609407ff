use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::hours::Hours;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Which vendor export a record or edit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Plx,
    Crescent,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plx => write!(f, "PLX"),
            Self::Crescent => write!(f, "Crescent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One employee's hours as reported by a single source.
///
/// Within a parsed table `eid` is unique; duplicate raw rows are folded
/// together by [`crate::aggregate::aggregate_records`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRecord {
    pub eid: String,
    pub name: String,
    pub total_hours: Hours,
    pub lines: BTreeSet<String>,
    pub badges: BTreeSet<String>,
    /// Some contributing raw row carried a non-numeric hours value.
    pub invalid_hours: bool,
}

impl EmployeeRecord {
    pub fn new(eid: impl Into<String>, name: impl Into<String>, total_hours: Hours) -> Self {
        Self {
            eid: eid.into(),
            name: name.into(),
            total_hours,
            lines: BTreeSet::new(),
            badges: BTreeSet::new(),
            invalid_hours: false,
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.insert(line.into());
        self
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badges.insert(badge.into());
        self
    }

    /// Sorted, de-duplicated, comma-joined work lines; `None` when there are none.
    pub fn lines_display(&self) -> Option<String> {
        join_set(&self.lines)
    }

    pub fn badges_display(&self) -> Option<String> {
        join_set(&self.badges)
    }
}

fn join_set(set: &BTreeSet<String>) -> Option<String> {
    if set.is_empty() {
        None
    } else {
        Some(set.iter().map(String::as_str).collect::<Vec<_>>().join(", "))
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Discrepancy category. Declaration order is the review priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyCategory {
    MismatchedHours,
    MissingFromCrescent,
    CrescentOnly,
    InvalidData,
    Match,
}

impl DiscrepancyCategory {
    /// Sort rank, most actionable first.
    pub fn priority(&self) -> u8 {
        match self {
            Self::MismatchedHours => 0,
            Self::MissingFromCrescent => 1,
            Self::CrescentOnly => 2,
            Self::InvalidData => 3,
            Self::Match => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MismatchedHours => "Mismatched Hours",
            Self::MissingFromCrescent => "No EID on Crescent",
            Self::CrescentOnly => "Crescent-only",
            Self::InvalidData => "Invalid data",
            Self::Match => "Match",
        }
    }

    pub fn is_discrepancy(&self) -> bool {
        *self != Self::Match
    }
}

impl std::fmt::Display for DiscrepancyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Operator's verdict on a reconciled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    #[default]
    Unresolved,
    Resolved,
    CrescentError,
    BadgeCorrectionNeeded,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolved => write!(f, "unresolved"),
            Self::Resolved => write!(f, "resolved"),
            Self::CrescentError => write!(f, "crescent error"),
            Self::BadgeCorrectionNeeded => write!(f, "badge correction needed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One canonical EID joined across both sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRow {
    pub eid: String,
    pub name_plx: String,
    pub name_crescent: String,
    pub total_hours_plx: Option<Hours>,
    pub total_hours_crescent: Option<Hours>,
    pub lines: Option<String>,
    pub badge: Option<String>,
    pub discrepancy: DiscrepancyCategory,
    pub resolution: Resolution,
    pub notes: String,
}

impl ReconciledRow {
    /// PLX name, then Crescent name; `None` when both are blank.
    pub fn display_name(&self) -> Option<&str> {
        [self.name_plx.as_str(), self.name_crescent.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|n| !n.is_empty())
    }
}

/// Grand totals of both sources after edits, filters and aliases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TotalsCheck {
    pub plx_total: Hours,
    pub crescent_total: Hours,
    /// PLX − Crescent.
    pub difference: Hours,
    pub within_tolerance: bool,
}

/// Per-category row counts for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconCounts {
    pub total: usize,
    pub mismatched_hours: usize,
    pub missing_from_crescent: usize,
    pub crescent_only: usize,
    pub invalid_data: usize,
    pub matched: usize,
    /// Discrepancy rows the operator has not marked resolved.
    pub open: usize,
}
