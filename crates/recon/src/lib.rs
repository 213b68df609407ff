//! `laborrecon-recon`: PLX vs Crescent labor-hour reconciliation.
//!
//! Pure engine crate: parses already-read export bytes into per-employee
//! records, joins them on canonical EID and classifies the differences.
//! No CLI dependencies.

pub mod aggregate;
pub mod alias;
pub mod classify;
pub mod config;
pub mod edit;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod hours;
pub mod model;
pub mod normalize;
pub mod review;
pub mod session;
pub mod source;
pub mod summary;

pub use alias::{apply_aliases, AliasMap, MergeOutcome};
pub use config::SessionConfig;
pub use edit::{apply_edits, RecordEdit};
pub use engine::{reconcile, DEFAULT_TOLERANCE};
pub use error::ReconError;
pub use evidence::{check_totals, compute_counts};
pub use hours::Hours;
pub use model::{
    DiscrepancyCategory, EmployeeRecord, ReconCounts, ReconciledRow, Resolution, SourceKind,
    TotalsCheck,
};
pub use normalize::{normalize_eid, IdentifierPolicy};
pub use review::{apply_review, ReviewBook};
pub use session::{ReviewSession, SessionOutput};
pub use source::crescent::{parse_crescent_report, parse_crescent_source, CrescentOptions, CrescentReport};
pub use source::plx::{parse_plx_source, DayFilter, PlxOptions};
pub use summary::{summarize, summarize_unresolved};
