use log::{debug, info};

use calamine::{open_workbook_auto, DataType, Reader};

use election_tables::{MemoryGrid, RawCellValue, Workbook};

use crate::extract::*;

fn read_cell(cell: &DataType) -> RawCellValue {
    match cell {
        DataType::String(s) if s.trim().is_empty() => RawCellValue::Absent,
        DataType::String(s) => RawCellValue::Text(s.clone()),
        DataType::Int(i) => RawCellValue::Int(*i),
        DataType::Float(f) => RawCellValue::Real(*f),
        // Booleans, dates and errors never hold a figure.
        _ => RawCellValue::Absent,
    }
}

/// Registers every worksheet of a workbook, under `<prefix>/<sheet>` when a
/// prefix is given.
///
/// The cells keep their position in the worksheet: a used range that does
/// not start at `A1` is shifted back into place.
pub fn read_excel_tables(path: &str, prefix: Option<&str>, wb: &mut Workbook) -> TabResult<()> {
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    for sheet in sheet_names.iter() {
        let range = match workbook.worksheet_range(sheet) {
            Some(r) => r.context(OpeningExcelSnafu { path })?,
            None => continue,
        };
        let (row0, col0) = range.start().unwrap_or((0, 0));
        let mut grid = MemoryGrid::default();
        for (r, row) in range.rows().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let v = read_cell(cell);
                if v != RawCellValue::Absent {
                    grid.set(row0 as usize + r, col0 as usize + c, v);
                }
            }
        }
        let name = match prefix {
            Some(p) => format!("{}/{}", p, sheet),
            None => sheet.clone(),
        };
        debug!(
            "read_excel_tables: {:?}: {:?} rows",
            name,
            range.get_size().0
        );
        wb.insert(&name, grid);
    }
    info!(
        "read_excel_tables: {} worksheets read from {}",
        sheet_names.len(),
        path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_types() {
        assert_eq!(read_cell(&DataType::Int(3)), RawCellValue::Int(3));
        assert_eq!(
            read_cell(&DataType::Float(879.676)),
            RawCellValue::Real(879.676)
        );
        assert_eq!(
            read_cell(&DataType::String("北海道".to_string())),
            RawCellValue::Text("北海道".to_string())
        );
        assert_eq!(
            read_cell(&DataType::String("\u{3000}".to_string())),
            RawCellValue::Absent
        );
        assert_eq!(read_cell(&DataType::Bool(true)), RawCellValue::Absent);
        assert_eq!(read_cell(&DataType::Empty), RawCellValue::Absent);
    }
}
