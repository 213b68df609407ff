use crate::hours::Hours;
use crate::model::{DiscrepancyCategory, EmployeeRecord, ReconCounts, ReconciledRow, Resolution, TotalsCheck};

/// Compare grand totals of both tables. `tolerance` is rounded to the
/// nearest hundredth before comparing.
pub fn check_totals(plx: &[EmployeeRecord], crescent: &[EmployeeRecord], tolerance: f64) -> TotalsCheck {
    let plx_total: Hours = plx.iter().map(|r| r.total_hours).sum();
    let crescent_total: Hours = crescent.iter().map(|r| r.total_hours).sum();
    TotalsCheck {
        plx_total,
        crescent_total,
        difference: plx_total - crescent_total,
        within_tolerance: plx_total.within(crescent_total, Hours::from_f64(tolerance)),
    }
}

impl TotalsCheck {
    pub fn message(&self) -> String {
        if self.within_tolerance {
            "Totals match".to_string()
        } else {
            format!("Difference of {} hours", self.difference.to_fixed())
        }
    }
}

/// Compute per-category counts from reconciled rows.
pub fn compute_counts(rows: &[ReconciledRow]) -> ReconCounts {
    let mut counts = ReconCounts {
        total: rows.len(),
        ..ReconCounts::default()
    };

    for r in rows {
        match r.discrepancy {
            DiscrepancyCategory::MismatchedHours => counts.mismatched_hours += 1,
            DiscrepancyCategory::MissingFromCrescent => counts.missing_from_crescent += 1,
            DiscrepancyCategory::CrescentOnly => counts.crescent_only += 1,
            DiscrepancyCategory::InvalidData => counts.invalid_data += 1,
            DiscrepancyCategory::Match => counts.matched += 1,
        }
        if r.discrepancy.is_discrepancy() && r.resolution != Resolution::Resolved {
            counts.open += 1;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile;

    fn rec(eid: &str, hours: f64) -> EmployeeRecord {
        EmployeeRecord::new(eid, "", Hours::from_f64(hours))
    }

    #[test]
    fn totals_messages() {
        let same = check_totals(&[rec("1", 40.0)], &[rec("1", 30.0), rec("2", 10.0)], 0.01);
        assert!(same.within_tolerance);
        assert_eq!(same.message(), "Totals match");

        let off = check_totals(&[rec("1", 40.0)], &[rec("1", 37.5)], 0.01);
        assert_eq!(off.difference, Hours::from_centi(250));
        assert_eq!(off.message(), "Difference of 2.50 hours");

        let under = check_totals(&[rec("1", 1.0)], &[rec("1", 2.25)], 0.01);
        assert_eq!(under.message(), "Difference of -1.25 hours");
    }

    #[test]
    fn empty_totals_match() {
        let t = check_totals(&[], &[], 0.0);
        assert_eq!(t.plx_total, Hours::ZERO);
        assert_eq!(t.message(), "Totals match");
    }

    #[test]
    fn counts_by_category() {
        let mut rows = reconcile(
            &[rec("1", 40.0), rec("2", 8.0), rec("3", 1.0)],
            &[rec("1", 40.0), rec("3", 2.0), rec("4", 1.0)],
            0.01,
        )
        .unwrap();
        let counts = compute_counts(&rows);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.matched, 1);
        assert_eq!(counts.mismatched_hours, 1);
        assert_eq!(counts.missing_from_crescent, 1);
        assert_eq!(counts.crescent_only, 1);
        assert_eq!(counts.open, 3);

        rows[0].resolution = Resolution::Resolved;
        assert_eq!(compute_counts(&rows).open, 2);
    }
}
