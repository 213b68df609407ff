//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `lrecon` exit codes.
//! Exit codes are part of the shell contract; payroll scripts branch on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success, no open discrepancies                     |
//! | 1    | Reconciliation ran and found open discrepancies    |
//! | 2    | CLI usage error (bad args)                         |
//! | 3    | Invalid session file                               |
//! | 4    | An export could not be parsed                      |
//! | 5    | Reconciliation pass failed (e.g. duplicate EID)    |
//! | 6    | File read/write failure                            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into [`recon_exit_code`] or the command's error handling

use laborrecon_io::IoError;
use laborrecon_recon::ReconError;

/// Success - command completed, nothing left to review.
pub const EXIT_SUCCESS: u8 = 0;

/// Discrepancies found. Like `diff(1)`, exit 1 means "sources differ."
pub const EXIT_DISCREPANCIES: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Session file is not valid TOML or fails validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// An export is missing required columns or is not a readable spreadsheet.
pub const EXIT_PARSE: u8 = 4;

/// The reconciliation pass itself was rejected.
pub const EXIT_RECONCILE: u8 = 5;

/// Reading an input or writing an output file failed.
pub const EXIT_IO: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::InvalidMergeRequest(_)
        | ReconError::InvalidEdit { .. }
        | ReconError::InvalidTolerance(_) => EXIT_INVALID_CONFIG,
        ReconError::MissingColumn { .. } | ReconError::MalformedIdentifier { .. } => EXIT_PARSE,
        ReconError::DuplicateIdentifier { .. } => EXIT_RECONCILE,
        ReconError::Io(IoError::Read { .. }) => EXIT_IO,
        ReconError::Io(_) => EXIT_PARSE,
    }
}
