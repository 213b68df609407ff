//! One operator review session.
//!
//! The session owns the latest successfully parsed table per vendor plus the
//! operator's merges, edits and annotations. Every [`ReviewSession::recalculate`]
//! is a full deterministic pass over that state:
//!
//! edits → hide-zero filter (PLX) → aliases → reconcile → review → totals → summary
//!
//! Nothing in the pass mutates the session, so recalculating twice without an
//! intervening change yields identical output.

use std::path::Path;

use serde::Serialize;

use crate::alias::{apply_aliases, AliasMap, MergeOutcome};
use crate::config::SessionConfig;
use crate::edit::{apply_edits, RecordEdit};
use crate::engine::{reconcile, validate_tolerance, DEFAULT_TOLERANCE};
use crate::error::ReconError;
use crate::evidence::{check_totals, compute_counts};
use crate::model::{EmployeeRecord, ReconCounts, ReconciledRow, Resolution, SourceKind, TotalsCheck};
use crate::review::{apply_review, ReviewBook};
use crate::source::crescent::{parse_crescent_report, CrescentOptions};
use crate::source::plx::{parse_plx_source, PlxOptions};
use crate::summary::summarize_unresolved;

/// Result of one recalculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOutput {
    pub rows: Vec<ReconciledRow>,
    pub totals: TotalsCheck,
    pub counts: ReconCounts,
    /// Email text for discrepancies not yet marked resolved.
    pub summary: String,
    /// Crescent rows excluded for an unusable badge, as messages.
    pub rejected: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewSession {
    plx: Vec<EmployeeRecord>,
    crescent: Vec<EmployeeRecord>,
    rejected: Vec<String>,
    aliases: AliasMap,
    edits: Vec<RecordEdit>,
    review: ReviewBook,
    tolerance: f64,
    hide_zero_hours: bool,
}

impl ReviewSession {
    pub fn new(plx: Vec<EmployeeRecord>, crescent: Vec<EmployeeRecord>) -> Self {
        Self {
            plx,
            crescent,
            rejected: Vec::new(),
            aliases: AliasMap::new(),
            edits: Vec::new(),
            review: ReviewBook::new(),
            tolerance: DEFAULT_TOLERANCE,
            hide_zero_hours: false,
        }
    }

    /// Read both exports named by `config`, relative to `base_dir`, and seed
    /// the operator state from the file.
    pub fn from_config(config: &SessionConfig, base_dir: &Path) -> Result<Self, ReconError> {
        config.validate()?;

        let plx_bytes = laborrecon_io::read_bytes(&config.plx_path(base_dir))?;
        let crescent_bytes = laborrecon_io::read_bytes(&config.crescent_path(base_dir))?;

        let mut session = Self::new(Vec::new(), Vec::new());
        session.load_plx(&plx_bytes, &config.plx_options())?;
        session.load_crescent(&crescent_bytes, &config.crescent_options())?;

        session.aliases = config.alias_map()?;
        session.edits = config.edits.clone();
        for entry in &config.review {
            session.review.annotate(&entry.eid, entry.resolution, entry.notes.clone());
        }
        session.tolerance = config.tolerance;
        session.hide_zero_hours = config.hide_zero_hours;

        log::info!(
            "session '{}': {} PLX, {} Crescent records, {} aliases, {} edits",
            config.name,
            session.plx.len(),
            session.crescent.len(),
            session.aliases.len(),
            session.edits.len()
        );
        Ok(session)
    }

    /// Parse a new PLX export. On failure the previous table is kept.
    pub fn load_plx(&mut self, bytes: &[u8], options: &PlxOptions) -> Result<(), ReconError> {
        self.plx = parse_plx_source(bytes, options)?;
        Ok(())
    }

    /// Parse a new Crescent export. On failure the previous table is kept.
    pub fn load_crescent(&mut self, bytes: &[u8], options: &CrescentOptions) -> Result<(), ReconError> {
        let report = parse_crescent_report(bytes, options)?;
        self.crescent = report.records;
        self.rejected = report.rejected.iter().map(|e| e.to_string()).collect();
        Ok(())
    }

    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<(), ReconError> {
        validate_tolerance(tolerance)?;
        self.tolerance = tolerance;
        Ok(())
    }

    pub fn set_hide_zero_hours(&mut self, hide: bool) {
        self.hide_zero_hours = hide;
    }

    pub fn merge_identifiers<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        canonical: &str,
    ) -> Result<MergeOutcome, ReconError> {
        self.aliases.merge_identifiers(ids, canonical)
    }

    /// Queue a manual override. Applied on every later recalculation.
    pub fn edit(&mut self, edit: RecordEdit) -> Result<(), ReconError> {
        edit.validate()?;
        self.edits.push(edit);
        Ok(())
    }

    pub fn annotate(&mut self, eid: &str, resolution: Resolution, notes: impl Into<String>) {
        self.review.annotate(eid, resolution, notes);
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn records(&self, source: SourceKind) -> &[EmployeeRecord] {
        match source {
            SourceKind::Plx => &self.plx,
            SourceKind::Crescent => &self.crescent,
        }
    }

    pub fn recalculate(&self) -> Result<SessionOutput, ReconError> {
        let mut plx = apply_edits(&self.plx, SourceKind::Plx, &self.edits)?;
        let crescent = apply_edits(&self.crescent, SourceKind::Crescent, &self.edits)?;

        if self.hide_zero_hours {
            let before = plx.len();
            plx.retain(|r| !r.total_hours.is_zero() || r.invalid_hours);
            log::debug!("hid {} zero-hour PLX associates", before - plx.len());
        }

        let plx = apply_aliases(plx, &self.aliases);
        let crescent = apply_aliases(crescent, &self.aliases);

        let rows = apply_review(reconcile(&plx, &crescent, self.tolerance)?, &self.review);
        let totals = check_totals(&plx, &crescent, self.tolerance);
        let counts = compute_counts(&rows);
        let summary = summarize_unresolved(&rows);

        Ok(SessionOutput {
            rows,
            totals,
            counts,
            summary,
            rejected: self.rejected.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hours::Hours;
    use crate::model::DiscrepancyCategory;

    fn session() -> ReviewSession {
        ReviewSession::new(
            vec![
                EmployeeRecord::new("111", "J Doe", Hours::from_centi(4000)),
                EmployeeRecord::new("222", "A Roe", Hours::ZERO),
            ],
            vec![
                EmployeeRecord::new("111", "", Hours::from_centi(3800))
                    .with_line("12")
                    .with_badge("PLX-111-ABC"),
                EmployeeRecord::new("333", "", Hours::from_centi(200)).with_badge("PLX-333-ABC"),
            ],
        )
    }

    #[test]
    fn recalculate_is_deterministic() {
        let s = session();
        assert_eq!(s.recalculate().unwrap(), s.recalculate().unwrap());
    }

    #[test]
    fn full_pass() {
        let out = session().recalculate().unwrap();
        assert_eq!(out.rows.len(), 3);
        assert_eq!(out.rows[0].discrepancy, DiscrepancyCategory::MismatchedHours);
        assert_eq!(out.totals.plx_total, Hours::from_centi(4000));
        assert_eq!(out.totals.crescent_total, Hours::from_centi(4000));
        assert_eq!(out.totals.message(), "Totals match");
        assert_eq!(out.counts.open, 3);
        assert!(out
            .summary
            .starts_with("J Doe - Worked Line 12 for 40 (correct), not 38 (incorrect). [PLX-111-ABC]"));
    }

    #[test]
    fn hide_zero_hours_drops_plx_only() {
        let mut s = session();
        s.set_hide_zero_hours(true);
        let out = s.recalculate().unwrap();
        assert!(out.rows.iter().all(|r| r.eid != "222"));
        assert!(out.rows.iter().any(|r| r.eid == "333"));
    }

    #[test]
    fn merge_then_recalculate() {
        let mut s = session();
        s.merge_identifiers(&["111", "333"], "111").unwrap();
        let out = s.recalculate().unwrap();
        let row = out.rows.iter().find(|r| r.eid == "111").unwrap();
        assert_eq!(row.total_hours_crescent, Some(Hours::from_centi(4000)));
        assert_eq!(row.discrepancy, DiscrepancyCategory::Match);
        assert!(out.rows.iter().all(|r| r.eid != "333"));
    }

    #[test]
    fn failed_merge_leaves_state() {
        let mut s = session();
        assert!(s.merge_identifiers(&["111"], "111").is_err());
        assert!(s.aliases().is_empty());
    }

    #[test]
    fn edits_and_annotations_carry_forward() {
        let mut s = session();
        s.edit(RecordEdit::hours(SourceKind::Crescent, "111", 40.0)).unwrap();
        s.annotate("333", Resolution::Resolved, "temp badge");
        let out = s.recalculate().unwrap();

        let joe = out.rows.iter().find(|r| r.eid == "111").unwrap();
        assert_eq!(joe.discrepancy, DiscrepancyCategory::Match);
        let temp = out.rows.iter().find(|r| r.eid == "333").unwrap();
        assert_eq!(temp.notes, "temp badge");
        assert!(!out.summary.contains("PLX-333-ABC"));
        assert_eq!(out.counts.open, 1);

        // The parsed table itself is untouched.
        assert_eq!(s.records(SourceKind::Crescent)[0].total_hours, Hours::from_centi(3800));
    }

    #[test]
    fn invalid_edit_is_rejected_up_front() {
        let mut s = session();
        assert!(s.edit(RecordEdit::hours(SourceKind::Plx, "111", -1.0)).is_err());
        assert!(s.recalculate().is_ok());
    }

    #[test]
    fn failed_reparse_keeps_previous_table() {
        let mut s = session();
        let err = s
            .load_crescent(b"Employee,Hours\n1,2\n", &CrescentOptions::default())
            .unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { .. }));
        assert_eq!(s.records(SourceKind::Crescent).len(), 2);
    }

    #[test]
    fn reloaded_crescent_reports_rejections() {
        let mut s = session();
        s.load_crescent(
            b"Badge,Hours,Line\nPLX-111-ABC,40,12\nBADGE-XYZ,3,12\n",
            &CrescentOptions::default(),
        )
        .unwrap();
        let out = s.recalculate().unwrap();
        assert_eq!(out.rejected.len(), 1);
        assert!(out.rejected[0].contains("BADGE-XYZ"));
        assert_eq!(out.counts.matched, 1);
    }

    #[test]
    fn bad_tolerance_rejected() {
        let mut s = session();
        assert!(s.set_tolerance(-1.0).is_err());
        assert_eq!(s.tolerance(), DEFAULT_TOLERANCE);
        s.set_tolerance(2.0).unwrap();
        let out = s.recalculate().unwrap();
        assert_eq!(out.counts.matched, 1);
    }
}
