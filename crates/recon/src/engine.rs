use std::collections::{BTreeSet, HashMap, HashSet};

use crate::classify::{classify_matched, classify_unmatched};
use crate::error::ReconError;
use crate::hours::Hours;
use crate::model::{DiscrepancyCategory, EmployeeRecord, ReconciledRow, Resolution, SourceKind};

/// Default hours tolerance for a `Match`.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Full outer join of the two tables on EID, classified and ordered for review.
///
/// Join order is PLX input order followed by Crescent-only records in input
/// order; the final sort by category priority is stable, so that order
/// survives within each category. `tolerance` is rounded to the nearest
/// hundredth of an hour.
pub fn reconcile(
    plx: &[EmployeeRecord],
    crescent: &[EmployeeRecord],
    tolerance: f64,
) -> Result<Vec<ReconciledRow>, ReconError> {
    validate_tolerance(tolerance)?;
    let tolerance = Hours::from_f64(tolerance);
    ensure_unique(SourceKind::Plx, plx)?;
    ensure_unique(SourceKind::Crescent, crescent)?;

    let crescent_by_eid: HashMap<&str, &EmployeeRecord> =
        crescent.iter().map(|r| (r.eid.as_str(), r)).collect();

    let mut rows = Vec::with_capacity(plx.len() + crescent.len());

    for p in plx {
        let c = crescent_by_eid.get(p.eid.as_str()).copied();
        let discrepancy = match c {
            Some(c) => classify_matched(p, c, tolerance),
            None => classify_unmatched(Some(p)),
        };
        rows.push(build_row(&p.eid, Some(p), c, discrepancy));
    }

    let plx_eids: HashSet<&str> = plx.iter().map(|r| r.eid.as_str()).collect();
    for c in crescent.iter().filter(|c| !plx_eids.contains(c.eid.as_str())) {
        rows.push(build_row(&c.eid, None, Some(c), classify_unmatched(None)));
    }

    rows.sort_by_key(|r| r.discrepancy.priority());

    log::debug!(
        "reconciled {} PLX and {} Crescent records into {} rows",
        plx.len(),
        crescent.len(),
        rows.len()
    );
    Ok(rows)
}

pub fn validate_tolerance(tolerance: f64) -> Result<(), ReconError> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(ReconError::InvalidTolerance(tolerance))
    }
}

fn ensure_unique(vendor: SourceKind, records: &[EmployeeRecord]) -> Result<(), ReconError> {
    let mut seen = HashSet::with_capacity(records.len());
    for r in records {
        if !seen.insert(r.eid.as_str()) {
            return Err(ReconError::DuplicateIdentifier {
                vendor,
                eid: r.eid.clone(),
            });
        }
    }
    Ok(())
}

fn build_row(
    eid: &str,
    plx: Option<&EmployeeRecord>,
    crescent: Option<&EmployeeRecord>,
    discrepancy: DiscrepancyCategory,
) -> ReconciledRow {
    let mut lines = BTreeSet::new();
    let mut badges = BTreeSet::new();
    for r in plx.iter().chain(crescent.iter()) {
        lines.extend(r.lines.iter().cloned());
        badges.extend(r.badges.iter().cloned());
    }
    let joined = |set: BTreeSet<String>| {
        if set.is_empty() {
            None
        } else {
            Some(set.into_iter().collect::<Vec<_>>().join(", "))
        }
    };

    ReconciledRow {
        eid: eid.to_string(),
        name_plx: plx.map(|r| r.name.clone()).unwrap_or_default(),
        name_crescent: crescent.map(|r| r.name.clone()).unwrap_or_default(),
        total_hours_plx: plx.map(|r| r.total_hours),
        total_hours_crescent: crescent.map(|r| r.total_hours),
        lines: joined(lines),
        badge: joined(badges),
        discrepancy,
        resolution: Resolution::Unresolved,
        notes: String::new(),
    }
}
