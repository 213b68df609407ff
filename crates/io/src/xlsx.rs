// Excel workbook decoding (xlsx, xls, xlsb, ods) into a Grid

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};

use crate::error::IoError;
use crate::grid::{Cell, Grid};

/// Read the first worksheet of a workbook held in memory.
///
/// Grid coordinates are absolute: if the used range starts below A1, the
/// leading rows and columns are padded with empty cells so a fixed header
/// row offset still lands on the right row.
pub fn read_workbook_grid(bytes: &[u8]) -> Result<Grid, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IoError::Spreadsheet(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IoError::EmptyWorkbook)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IoError::Spreadsheet(format!("sheet '{}': {}", sheet_name, e)))?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    log::debug!(
        "decoded sheet '{}': {} rows, origin ({}, {})",
        sheet_name,
        rows.len(),
        start_row,
        start_col
    );
    Ok(Grid::new(rows))
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        // Serial number; hour columns never hold dates, but keep the value numeric
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(build: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        build(sheet);
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn typed_cells_survive() {
        let bytes = workbook_bytes(|ws| {
            ws.write_string(0, 0, "File").unwrap();
            ws.write_string(0, 1, "Name").unwrap();
            ws.write_number(1, 0, 457123.0).unwrap();
            ws.write_string(1, 1, "J Doe").unwrap();
        });
        let grid = read_workbook_grid(&bytes).unwrap();
        assert_eq!(grid.cell(0, 0), &Cell::Text("File".into()));
        assert_eq!(grid.cell(1, 0), &Cell::Number(457123.0));
        assert_eq!(grid.cell(1, 1), &Cell::Text("J Doe".into()));
    }

    #[test]
    fn leading_blank_rows_are_padded() {
        // Used range starts at C5; row/column indices must stay absolute.
        let bytes = workbook_bytes(|ws| {
            ws.write_string(4, 2, "File").unwrap();
            ws.write_number(5, 2, 42.0).unwrap();
        });
        let grid = read_workbook_grid(&bytes).unwrap();
        assert_eq!(grid.cell(4, 2), &Cell::Text("File".into()));
        assert_eq!(grid.cell(5, 2), &Cell::Number(42.0));
        assert_eq!(grid.cell(0, 0), &Cell::Empty);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = read_workbook_grid(b"PK\x03\x04not really a zip").unwrap_err();
        assert!(matches!(err, IoError::Spreadsheet(_)));
    }
}
