use thiserror::Error;

use crate::model::SourceKind;

#[derive(Debug, Error)]
pub enum ReconError {
    /// A required column could not be located in the header row.
    #[error("{vendor} file: missing required column(s) {required:?}; found columns {found:?}")]
    MissingColumn {
        vendor: SourceKind,
        found: Vec<String>,
        required: Vec<String>,
    },
    /// Identifier present but not in the expected grammar. Row-level; never aborts a parse.
    #[error("row {row}: malformed identifier '{value}'")]
    MalformedIdentifier { row: usize, value: String },
    /// The same EID appears twice in one input table handed to the engine.
    #[error("{vendor} table contains duplicate identifier '{eid}'")]
    DuplicateIdentifier { vendor: SourceKind, eid: String },
    #[error("invalid merge request: {0}")]
    InvalidMergeRequest(String),
    #[error("tolerance must be a finite, non-negative number of hours, got {0}")]
    InvalidTolerance(f64),
    #[error("edit for '{eid}': {reason}")]
    InvalidEdit { eid: String, reason: String },
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    #[error(transparent)]
    Io(#[from] laborrecon_io::IoError),
}
