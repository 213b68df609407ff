// Identifier and hours normalization shared by both source parsers.

use laborrecon_io::Cell;

use crate::hours::Hours;

/// Rules applied after digit filtering. Both parsers must receive the same policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentifierPolicy {
    /// Treat `00457123` and `457123` as the same employee.
    pub strip_leading_zeros: bool,
}

/// Canonical digits-only EID. An empty result means "no usable identifier".
///
/// Strips surrounding whitespace and one trailing `.0` left by numeric-to-text
/// coercion, then keeps ASCII digits only.
pub fn normalize_eid(raw: &str, policy: IdentifierPolicy) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if policy.strip_leading_zeros && !digits.is_empty() {
        let stripped = digits.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    } else {
        digits
    }
}

/// [`normalize_eid`] over a decoded cell. Numeric cells go through integral formatting first.
pub fn normalize_cell_eid(cell: &Cell, policy: IdentifierPolicy) -> String {
    normalize_eid(&cell.as_text(), policy)
}

// ---------------------------------------------------------------------------
// Hours
// ---------------------------------------------------------------------------

/// Outcome of reading one hours cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursCell {
    Blank,
    Value(Hours),
    /// Present but not a usable number of hours. Counts as zero.
    Invalid,
}

pub fn read_hours(cell: &Cell) -> HoursCell {
    match cell {
        Cell::Empty => HoursCell::Blank,
        Cell::Text(s) if s.trim().is_empty() => HoursCell::Blank,
        Cell::Text(s) => Hours::parse(s).map_or(HoursCell::Invalid, HoursCell::Value),
        Cell::Number(n) if n.is_finite() && *n >= 0.0 => HoursCell::Value(Hours::from_f64(*n)),
        Cell::Number(_) => HoursCell::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEEP: IdentifierPolicy = IdentifierPolicy { strip_leading_zeros: false };
    const STRIP: IdentifierPolicy = IdentifierPolicy { strip_leading_zeros: true };

    #[test]
    fn eid_digits_only() {
        assert_eq!(normalize_eid(" 457123 ", KEEP), "457123");
        assert_eq!(normalize_eid("457123.0", KEEP), "457123");
        assert_eq!(normalize_eid("EMP-45-71", KEEP), "4571");
        assert_eq!(normalize_eid("00457123", KEEP), "00457123");
        assert_eq!(normalize_eid("n/a", KEEP), "");
        assert_eq!(normalize_eid("", KEEP), "");
    }

    #[test]
    fn trailing_zero_artifact_only_stripped_once() {
        // "10.0" is the float rendering of 10; "100" must keep its zeros.
        assert_eq!(normalize_eid("10.0", KEEP), "10");
        assert_eq!(normalize_eid("100", KEEP), "100");
    }

    #[test]
    fn leading_zero_policy() {
        assert_eq!(normalize_eid("00457123", STRIP), "457123");
        assert_eq!(normalize_eid("000", STRIP), "0");
        assert_eq!(normalize_eid("abc", STRIP), "");
    }

    #[test]
    fn numeric_cells_normalize_like_text() {
        assert_eq!(normalize_cell_eid(&Cell::Number(457123.0), KEEP), "457123");
        assert_eq!(
            normalize_cell_eid(&Cell::Text("457123.0".into()), KEEP),
            "457123"
        );
    }

    #[test]
    fn hours_cells() {
        assert_eq!(read_hours(&Cell::Empty), HoursCell::Blank);
        assert_eq!(read_hours(&Cell::Text("  ".into())), HoursCell::Blank);
        assert_eq!(read_hours(&Cell::Number(8.0)), HoursCell::Value(Hours::from_centi(800)));
        assert_eq!(
            read_hours(&Cell::Text("1,040.5".into())),
            HoursCell::Value(Hours::from_centi(104_050))
        );
        assert_eq!(read_hours(&Cell::Text("eight".into())), HoursCell::Invalid);
        assert_eq!(read_hours(&Cell::Text("(2)".into())), HoursCell::Invalid);
        assert_eq!(read_hours(&Cell::Text("-2".into())), HoursCell::Invalid);
        assert_eq!(read_hours(&Cell::Number(-1.0)), HoursCell::Invalid);
        assert_eq!(read_hours(&Cell::Number(f64::NAN)), HoursCell::Invalid);
    }
}
