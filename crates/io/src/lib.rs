//! `laborrecon-io`: turns vendor export bytes into a cell grid.
//!
//! No domain knowledge lives here: header offsets, column matching and
//! identifier rules belong to the source parsers in `laborrecon-recon`.

pub mod csv;
pub mod error;
pub mod grid;
pub mod xlsx;

use std::path::Path;

pub use error::IoError;
pub use grid::{Cell, Grid};

/// Container format inferred from leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Zip-based workbook (xlsx, xlsm, ods).
    Workbook,
    /// OLE compound document (legacy xls).
    LegacyWorkbook,
    /// Delimited text.
    Text,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

pub fn detect_format(bytes: &[u8]) -> SourceFormat {
    if bytes.starts_with(ZIP_MAGIC) {
        SourceFormat::Workbook
    } else if bytes.starts_with(OLE_MAGIC) {
        SourceFormat::LegacyWorkbook
    } else {
        SourceFormat::Text
    }
}

/// Decode any supported export into a grid.
pub fn read_grid(bytes: &[u8]) -> Result<Grid, IoError> {
    match detect_format(bytes) {
        SourceFormat::Workbook | SourceFormat::LegacyWorkbook => xlsx::read_workbook_grid(bytes),
        SourceFormat::Text => csv::read_text_grid(bytes),
    }
}

/// Read a file from disk into memory.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, IoError> {
    std::fs::read(path).map_err(|source| IoError::Read {
        path: path.display().to_string(),
        source,
    })
}
