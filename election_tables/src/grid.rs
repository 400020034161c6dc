use log::debug;
use snafu::{ensure, OptionExt};

use std::ops::RangeInclusive;

use crate::config::*;

/// A table of cells, addressed with 0-based positions.
pub trait CellGrid {
    fn cell(&self, row: usize, col: usize) -> RawCellValue;
    /// The number of rows.
    fn max_row(&self) -> usize;
    /// The number of columns of the widest row.
    fn max_col(&self) -> usize;
}

/// A collection of named tables.
pub trait GridSource {
    fn grid(&self, table: &str) -> Option<&dyn CellGrid>;
    fn table_names(&self) -> Vec<String>;
}

/// A table held in memory. Rows may have different lengths.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct MemoryGrid {
    rows: Vec<Vec<RawCellValue>>,
}

impl MemoryGrid {
    pub fn new(rows: Vec<Vec<RawCellValue>>) -> MemoryGrid {
        MemoryGrid { rows }
    }

    /// Builds a grid from textual fields, guessing the type of each cell.
    pub fn from_text(rows: &[&[&str]]) -> MemoryGrid {
        MemoryGrid {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| RawCellValue::infer(s)).collect())
                .collect(),
        }
    }

    /// Sets the value at a 0-based position, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: RawCellValue) {
        if self.rows.len() <= row {
            self.rows.resize(row + 1, Vec::new());
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize(col + 1, RawCellValue::Absent);
        }
        r[col] = value;
    }
}

impl CellGrid for MemoryGrid {
    fn cell(&self, row: usize, col: usize) -> RawCellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or(RawCellValue::Absent)
    }

    fn max_row(&self) -> usize {
        self.rows.len()
    }

    fn max_col(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Named grids, in order of insertion.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Workbook {
    grids: Vec<(String, MemoryGrid)>,
}

impl Workbook {
    pub fn new() -> Workbook {
        Workbook { grids: Vec::new() }
    }

    /// Adds a table. A table with the same name is replaced.
    pub fn insert(&mut self, name: &str, grid: MemoryGrid) {
        if let Some(p) = self.grids.iter_mut().find(|(n, _)| n == name) {
            p.1 = grid;
        } else {
            self.grids.push((name.to_string(), grid));
        }
    }

    pub fn with_table(mut self, name: &str, grid: MemoryGrid) -> Workbook {
        self.insert(name, grid);
        self
    }
}

impl GridSource for Workbook {
    fn grid(&self, table: &str) -> Option<&dyn CellGrid> {
        self.grids
            .iter()
            .find(|(n, _)| n == table)
            .map(|(_, g)| g as &dyn CellGrid)
    }

    fn table_names(&self) -> Vec<String> {
        self.grids.iter().map(|(n, _)| n.clone()).collect()
    }
}

/// Access to one table with the positions of the configuration.
///
/// Reading a row that the table does not have is an error: the layout of the
/// source does not match the configuration. Columns past the end of a row
/// read as absent, since the rows of the sources are ragged.
pub struct GridView<'a> {
    table: &'a str,
    grid: &'a dyn CellGrid,
    base: IndexBase,
}

impl<'a> GridView<'a> {
    pub fn open(
        source: &'a dyn GridSource,
        table: &'a str,
        base: IndexBase,
    ) -> ExtractionResult<GridView<'a>> {
        let grid = source.grid(table).context(MissingTableSnafu { table })?;
        debug!(
            "GridView::open: table {:?}: {} rows, {} columns",
            table,
            grid.max_row(),
            grid.max_col()
        );
        Ok(GridView { table, grid, base })
    }

    pub fn table(&self) -> &str {
        self.table
    }

    pub fn cell(&self, row: usize, col: usize) -> ExtractionResult<RawCellValue> {
        let offset = self.base.offset();
        ensure!(
            row >= offset && col >= offset,
            BelowIndexBaseSnafu {
                table: self.table,
                row,
                column: col,
                base: offset,
            }
        );
        let r = row - offset;
        ensure!(
            r < self.grid.max_row(),
            RowOutOfRangeSnafu {
                table: self.table,
                row,
                rows: self.grid.max_row(),
            }
        );
        Ok(self.grid.cell(r, col - offset))
    }

    /// The first column of the table, in the configured base.
    pub fn first_column(&self) -> usize {
        self.base.offset()
    }

    /// The last column of the table, in the configured base.
    pub fn last_column(&self) -> Option<usize> {
        self.grid
            .max_col()
            .checked_sub(1)
            .map(|c| c + self.base.offset())
    }

    /// The rows from `first` to `last` (inclusive), or to the end of the table.
    pub fn row_range(
        &self,
        first: usize,
        last: Option<usize>,
    ) -> ExtractionResult<RangeInclusive<usize>> {
        let offset = self.base.offset();
        let rows = self.grid.max_row();
        ensure!(
            rows > 0,
            RowOutOfRangeSnafu {
                table: self.table,
                row: first,
                rows,
            }
        );
        let end = last.unwrap_or(rows - 1 + offset);
        // Checks both ends of the range.
        self.cell(first, offset)?;
        self.cell(end, offset)?;
        Ok(first..=end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Workbook {
        Workbook::new().with_table(
            "Table 1",
            MemoryGrid::from_text(&[&["a", "1"], &["b", "2", "2.5"]]),
        )
    }

    #[test]
    fn one_based_access() {
        let wb = sample();
        let v = GridView::open(&wb, "Table 1", IndexBase::One).unwrap();
        assert_eq!(
            v.cell(1, 1).unwrap(),
            RawCellValue::Text("a".to_string())
        );
        assert_eq!(v.cell(2, 3).unwrap(), RawCellValue::Real(2.5));
        // Ragged rows.
        assert_eq!(v.cell(1, 3).unwrap(), RawCellValue::Absent);
        assert_eq!(v.cell(1, 40).unwrap(), RawCellValue::Absent);
        assert_eq!(v.last_column(), Some(3));
        assert_eq!(v.row_range(1, None).unwrap(), 1..=2);
    }

    #[test]
    fn zero_based_access() {
        let wb = sample();
        let v = GridView::open(&wb, "Table 1", IndexBase::Zero).unwrap();
        assert_eq!(v.cell(1, 1).unwrap(), RawCellValue::Int(2));
        assert_eq!(v.row_range(0, None).unwrap(), 0..=1);
    }

    #[test]
    fn schema_anomalies_are_errors() {
        let wb = sample();
        assert!(matches!(
            GridView::open(&wb, "Table 9", IndexBase::One),
            Err(ExtractionError::MissingTable { .. })
        ));
        let v = GridView::open(&wb, "Table 1", IndexBase::One).unwrap();
        assert!(matches!(
            v.cell(3, 1),
            Err(ExtractionError::RowOutOfRange { row: 3, rows: 2, .. })
        ));
        assert!(matches!(
            v.cell(0, 1),
            Err(ExtractionError::BelowIndexBase { .. })
        ));
        assert!(v.row_range(1, Some(5)).is_err());
    }

    #[test]
    fn workbook_replaces_tables() {
        let mut wb = sample();
        wb.insert("Table 1", MemoryGrid::from_text(&[&["x"]]));
        assert_eq!(wb.table_names(), vec!["Table 1".to_string()]);
        assert_eq!(wb.grid("Table 1").unwrap().max_row(), 1);
    }
}
