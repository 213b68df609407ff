use thiserror::Error;

/// Failure to turn raw export bytes into a grid.
#[derive(Debug, Error)]
pub enum IoError {
    /// calamine could not open or read the workbook.
    #[error("failed to read workbook: {0}")]
    Spreadsheet(String),
    #[error("workbook contains no sheets")]
    EmptyWorkbook,
    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
