// Primitives for reading CSV files.

use log::debug;

use election_tables::{MemoryGrid, RawCellValue};

use crate::extract::*;

/// Reads a whole CSV file as one table. Every line is a row, including the
/// first one: the headers of the sources are data for the column resolver.
pub fn read_csv_table(path: &str) -> TabResult<MemoryGrid> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut rows: Vec<Vec<RawCellValue>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let row: Vec<RawCellValue> = line.iter().map(RawCellValue::infer).collect();
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, row);
        rows.push(row);
    }
    Ok(MemoryGrid::new(rows))
}
