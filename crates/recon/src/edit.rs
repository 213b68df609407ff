use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::hours::Hours;
use crate::model::{EmployeeRecord, SourceKind};

/// Manual override of one parsed record. `None` fields keep the parsed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordEdit {
    pub source: SourceKind,
    pub eid: String,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lines: Option<Vec<String>>,
}

impl RecordEdit {
    pub fn hours(source: SourceKind, eid: impl Into<String>, hours: f64) -> Self {
        Self {
            source,
            eid: eid.into(),
            hours: Some(hours),
            name: None,
            lines: None,
        }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.eid.trim().is_empty() {
            return Err(ReconError::InvalidEdit {
                eid: self.eid.clone(),
                reason: "identifier is empty".into(),
            });
        }
        if self.hours.is_none() && self.name.is_none() && self.lines.is_none() {
            return Err(ReconError::InvalidEdit {
                eid: self.eid.clone(),
                reason: "no hours, name or lines to change".into(),
            });
        }
        if let Some(h) = self.hours {
            if !h.is_finite() || h < 0.0 {
                return Err(ReconError::InvalidEdit {
                    eid: self.eid.clone(),
                    reason: format!("hours must be a non-negative number, got {h}"),
                });
            }
        }
        Ok(())
    }
}

/// Apply the edits addressed to `source`, returning a new table.
///
/// All edits are validated before any is applied. Later edits for the same
/// EID win field by field.
pub fn apply_edits(
    records: &[EmployeeRecord],
    source: SourceKind,
    edits: &[RecordEdit],
) -> Result<Vec<EmployeeRecord>, ReconError> {
    let relevant: Vec<&RecordEdit> = edits.iter().filter(|e| e.source == source).collect();
    for edit in &relevant {
        edit.validate()?;
    }

    let mut out = records.to_vec();
    for edit in relevant {
        let eid = edit.eid.trim();
        let Some(record) = out.iter_mut().find(|r| r.eid == eid) else {
            log::warn!("{source} edit for unknown EID '{eid}' skipped");
            continue;
        };

        if let Some(hours) = edit.hours {
            record.total_hours = Hours::from_f64(hours);
            record.invalid_hours = false;
        }
        if let Some(name) = &edit.name {
            record.name = name.trim().to_string();
        }
        if let Some(lines) = &edit.lines {
            record.lines = lines
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<EmployeeRecord> {
        let mut bad = EmployeeRecord::new("222", "", Hours::ZERO);
        bad.invalid_hours = true;
        vec![EmployeeRecord::new("111", "J Doe", Hours::from_centi(3800)).with_line("12"), bad]
    }

    #[test]
    fn hours_override_clears_invalid_flag() {
        let out = apply_edits(
            &table(),
            SourceKind::Crescent,
            &[RecordEdit::hours(SourceKind::Crescent, "222", 7.5)],
        )
        .unwrap();
        assert_eq!(out[1].total_hours, Hours::from_centi(750));
        assert!(!out[1].invalid_hours);
    }

    #[test]
    fn edits_for_other_source_are_ignored() {
        let input = table();
        let out = apply_edits(
            &input,
            SourceKind::Plx,
            &[RecordEdit::hours(SourceKind::Crescent, "111", 40.0)],
        )
        .unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn name_and_lines_override() {
        let edit = RecordEdit {
            source: SourceKind::Plx,
            eid: " 111 ".into(),
            hours: None,
            name: Some(" John Doe ".into()),
            lines: Some(vec!["14".into(), " ".into(), "3".into()]),
        };
        let out = apply_edits(&table(), SourceKind::Plx, &[edit]).unwrap();
        assert_eq!(out[0].name, "John Doe");
        assert_eq!(out[0].total_hours, Hours::from_centi(3800));
        assert_eq!(out[0].lines_display().as_deref(), Some("14, 3"));
    }

    #[test]
    fn unknown_eid_is_skipped() {
        let input = table();
        let out = apply_edits(&input, SourceKind::Plx, &[RecordEdit::hours(SourceKind::Plx, "999", 1.0)])
            .unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn rejects_bad_hours() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = apply_edits(&table(), SourceKind::Plx, &[RecordEdit::hours(SourceKind::Plx, "111", bad)])
                .unwrap_err();
            assert!(matches!(err, ReconError::InvalidEdit { .. }));
        }
    }

    #[test]
    fn rejects_edit_that_changes_nothing() {
        let empty = RecordEdit {
            source: SourceKind::Plx,
            eid: "111".into(),
            hours: None,
            name: None,
            lines: None,
        };
        let err = apply_edits(&table(), SourceKind::Plx, &[empty]).unwrap_err();
        match err {
            ReconError::InvalidEdit { eid, reason } => {
                assert_eq!(eid, "111");
                assert!(reason.contains("no hours"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn operator_hours_round_to_hundredths() {
        let out = apply_edits(
            &table(),
            SourceKind::Crescent,
            &[RecordEdit::hours(SourceKind::Crescent, "222", 0.1 + 0.2)],
        )
        .unwrap();
        assert_eq!(out[1].total_hours, Hours::from_centi(30));
    }
}
