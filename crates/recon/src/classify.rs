use crate::hours::Hours;
use crate::model::{DiscrepancyCategory, EmployeeRecord};

/// Classify an EID present on both sides.
///
/// An unusable hours value on either side outranks the numeric comparison:
/// zero-coerced hours must never read as a `Match`.
pub fn classify_matched(
    plx: &EmployeeRecord,
    crescent: &EmployeeRecord,
    tolerance: Hours,
) -> DiscrepancyCategory {
    if plx.invalid_hours || crescent.invalid_hours {
        DiscrepancyCategory::InvalidData
    } else if plx.total_hours.within(crescent.total_hours, tolerance) {
        DiscrepancyCategory::Match
    } else {
        DiscrepancyCategory::MismatchedHours
    }
}

/// Classify an EID present on one side only.
pub fn classify_unmatched(plx: Option<&EmployeeRecord>) -> DiscrepancyCategory {
    match plx {
        Some(_) => DiscrepancyCategory::MissingFromCrescent,
        None => DiscrepancyCategory::CrescentOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Hours = Hours::from_centi(1);

    fn rec(hours: f64) -> EmployeeRecord {
        EmployeeRecord::new("1", "", Hours::from_f64(hours))
    }

    #[test]
    fn within_and_outside_tolerance() {
        assert_eq!(classify_matched(&rec(40.0), &rec(40.0), TOL), DiscrepancyCategory::Match);
        assert_eq!(classify_matched(&rec(40.01), &rec(40.0), TOL), DiscrepancyCategory::Match);
        assert_eq!(
            classify_matched(&rec(40.02), &rec(40.0), TOL),
            DiscrepancyCategory::MismatchedHours
        );
        assert_eq!(
            classify_matched(&rec(40.0), &rec(38.0), TOL),
            DiscrepancyCategory::MismatchedHours
        );
    }

    #[test]
    fn invalid_hours_win_over_numeric_match() {
        let mut bad = rec(0.0);
        bad.invalid_hours = true;
        assert_eq!(classify_matched(&rec(0.0), &bad, TOL), DiscrepancyCategory::InvalidData);
        assert_eq!(classify_matched(&bad, &rec(8.0), TOL), DiscrepancyCategory::InvalidData);
    }

    #[test]
    fn one_sided() {
        assert_eq!(classify_unmatched(Some(&rec(1.0))), DiscrepancyCategory::MissingFromCrescent);
        assert_eq!(classify_unmatched(None), DiscrepancyCategory::CrescentOnly);
    }
}
