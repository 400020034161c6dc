// ********* Input data structures ***********

use snafu::Snafu;

use crate::district::MergeTable;
use crate::party::PartyNames;

/// The value stored at one position of a table, before any interpretation.
///
/// Workbook-specific values (booleans, dates, error markers) are reported as
/// `Absent` by the grid sources: they never carry a figure.
#[derive(PartialEq, Debug, Clone)]
pub enum RawCellValue {
    Text(String),
    Int(i64),
    Real(f64),
    Absent,
}

impl RawCellValue {
    /// Guesses the type of a textual field, the way a spreadsheet would have
    /// stored it: plain integer and decimal literals become numbers, empty
    /// fields are absent and everything else stays text.
    pub fn infer(field: &str) -> RawCellValue {
        let s = field.trim();
        if s.is_empty() {
            return RawCellValue::Absent;
        }
        let numeric_chars = s
            .chars()
            .enumerate()
            .all(|(idx, c)| c.is_ascii_digit() || c == '.' || (c == '-' && idx == 0));
        if numeric_chars {
            if let Ok(i) = s.parse::<i64>() {
                return RawCellValue::Int(i);
            }
            if let Ok(f) = s.parse::<f64>() {
                return RawCellValue::Real(f);
            }
        }
        RawCellValue::Text(field.to_string())
    }

    pub fn is_absent(&self) -> bool {
        match self {
            RawCellValue::Absent => true,
            RawCellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, RawCellValue::Int(_) | RawCellValue::Real(_))
    }

    /// The textual content of a text cell with all the whitespace removed
    /// (including the full-width spaces used for alignment in the sources).
    /// Numbers and absent cells give an empty string.
    pub fn label(&self) -> String {
        match self {
            RawCellValue::Text(s) => s.chars().filter(|c| !c.is_whitespace()).collect(),
            _ => "".to_string(),
        }
    }

    /// Any content rendered as text, used when searching for patterns.
    pub fn display_text(&self) -> String {
        match self {
            RawCellValue::Text(s) => s.clone(),
            RawCellValue::Int(i) => i.to_string(),
            RawCellValue::Real(f) => f.to_string(),
            RawCellValue::Absent => "".to_string(),
        }
    }
}

/// The column range occupied by the sub-columns of one party in one table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartyColumn {
    pub party: String,
    pub start_column: usize,
    pub span: usize,
}

impl PartyColumn {
    pub fn new(party: &str, start_column: usize, span: usize) -> PartyColumn {
        PartyColumn {
            party: party.to_string(),
            start_column,
            span: span.max(1),
        }
    }

    /// The last column (inclusive) of the span.
    pub fn end_column(&self) -> usize {
        self.start_column + self.span - 1
    }
}

// ********* Configuration **********

/// Whether the row and column positions of the configuration count from 0 or 1.
///
/// All the positions in an `ExtractionConfig` (and in the `PartyColumn`s
/// produced from it) are expressed in this base. Only the `CellGrid`
/// implementations see 0-based positions.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum IndexBase {
    Zero,
    One,
}

impl IndexBase {
    pub fn offset(&self) -> usize {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

/// How real-valued cells holding vote counts should be read.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum VoteNotation {
    /// A fractional part in a real cell holds grouped digits: `879.676` is 879,676 votes.
    Grouped,
    /// Real cells are genuine decimal numbers (apportioned votes) and are rounded.
    Decimal,
}

impl Default for VoteNotation {
    fn default() -> Self {
        VoteNotation::Grouped
    }
}

/// The kinds of per-party figures that a table may report.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum PartyFigure {
    Seats,
    Votes,
    Rate,
}

impl std::fmt::Display for PartyFigure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartyFigure::Seats => write!(f, "seats"),
            PartyFigure::Votes => write!(f, "votes"),
            PartyFigure::Rate => write!(f, "vote rates"),
        }
    }
}

pub const DEFAULT_WINDOW: usize = 10;
pub const DEFAULT_ELECTED_SUFFIX: &str = "人";
pub const DEFAULT_TOTAL_MARKER: &str = "計";
pub const DEFAULT_TOTAL_LABEL: &str = "得票総数";

/// Reads the header of a table from a fixed first column: every non-empty
/// cell that is not excluded names a party occupying `stride` columns.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StrideScan {
    pub header_row: usize,
    pub first_column: usize,
    pub last_column: usize,
    pub stride: usize,
    pub excluded: Vec<String>,
}

/// Reads the header of a table by looking for the names of the known parties
/// in the cells of a row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LabelScan {
    pub header_row: usize,
    /// The number of columns, starting at the label, in which the figures are searched.
    pub window: usize,
}

/// The strategy used to find the party columns of a table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ColumnDiscovery {
    /// The columns are given by the configuration.
    Fixed(Vec<PartyColumn>),
    FixedStride(StrideScan),
    LabelInRow(LabelScan),
}

/// Whether the data rows of a district-side table follow the base units or
/// the (merged) districts.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RowKeying {
    Units,
    Districts,
}

/// The role played by a district-side table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum UnitFigure {
    /// The number of seats, as an annotated figure such as `6(1)`.
    Capacity { column: usize },
    /// The valid votes: the first non-zero value of the listed columns.
    ValidVotes { columns: Vec<usize> },
    /// Elected counts per party: the last non-zero cell of each party span.
    Seats { columns: ColumnDiscovery },
    /// Votes per party: the cell at `value_offset` inside each party span.
    Votes {
        columns: ColumnDiscovery,
        value_offset: usize,
    },
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct UnitTable {
    pub table: String,
    pub first_row: usize,
    pub keyed_by: RowKeying,
    /// Rows that restate the figures of a merged district.
    pub restated_rows: Vec<(String, usize)>,
    pub notation: VoteNotation,
    pub figure: UnitFigure,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DistrictLayout {
    pub merge_table: MergeTable,
    /// The canonical order of the districts. When not provided, it is derived
    /// from the order of the units through the merge table.
    pub district_order: Option<Vec<String>>,
    pub tables: Vec<UnitTable>,
}

/// The columns of one ranking inside a ranking table. A table may hold
/// several rankings side by side.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankingColumns {
    pub rank_column: usize,
    pub party_column: usize,
    pub votes_column: usize,
    pub rate_column: Option<usize>,
}

/// A table listing the parties of one block by rank, with their votes.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankingTable {
    pub table: String,
    pub first_row: usize,
    pub last_row: Option<usize>,
    pub groups: Vec<RankingColumns>,
    /// The party-column label of the row holding the total votes of the block.
    pub total_label: String,
    pub notation: VoteNotation,
}

/// The tables detailing the list of each party in one block. The parties
/// are found by their names in a header row, the figures in associated rows.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DetailTables {
    pub tables: Vec<String>,
    pub header_row: usize,
    pub votes_row: Option<usize>,
    pub seats_row: Option<usize>,
    pub window: usize,
    /// The text following an elected count, as in `3人`.
    pub elected_suffix: String,
    pub notation: VoteNotation,
}

/// One row of a table holding a figure for each party.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartyRowTable {
    pub table: String,
    pub row: usize,
    pub figure: PartyFigure,
    pub columns: ColumnDiscovery,
    pub value_offset: usize,
    pub notation: VoteNotation,
}

/// A source table attached to a single block.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BlockTable {
    Ranking(RankingTable),
    PartyDetail(DetailTables),
    PartyRow(PartyRowTable),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BlockSpec {
    pub name: String,
    /// The declared quota. When missing, it is read from the summary tables
    /// or reconstructed from the elected counts.
    pub total_seats: Option<u32>,
    pub members: Vec<String>,
    /// The texts identifying the block in the label columns of the summary tables.
    /// Defaults to the name of the block.
    pub labels: Vec<String>,
    pub tables: Vec<BlockTable>,
}

impl BlockSpec {
    pub fn detection_labels(&self) -> Vec<String> {
        if self.labels.is_empty() {
            vec![self.name.clone()]
        } else {
            self.labels.clone()
        }
    }
}

/// A table covering all the blocks, one group of rows per block.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SummaryTable {
    pub table: String,
    pub first_row: usize,
    pub last_row: Option<usize>,
    pub label_columns: Vec<usize>,
    pub marker_column: usize,
    pub total_marker: String,
    /// Rows whose marker contains one of these texts are headers, never totals.
    pub subheader_markers: Vec<String>,
    pub figure: PartyFigure,
    pub columns: ColumnDiscovery,
    pub value_offset: usize,
    pub total_votes_column: Option<usize>,
    pub quota_column: Option<usize>,
    pub notation: VoteNotation,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProportionalLayout {
    pub blocks: Vec<BlockSpec>,
    pub summaries: Vec<SummaryTable>,
}

/// Everything needed to extract one election from its source tables.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ExtractionConfig {
    pub year: u32,
    pub election_date: String,
    pub index_base: IndexBase,
    /// The canonical ordered list of the base administrative units.
    pub units: Vec<String>,
    pub parties: PartyNames,
    pub district: Option<DistrictLayout>,
    pub proportional: Option<ProportionalLayout>,
}

// ******** Errors *********

/// Errors that prevent the extraction from completing.
///
/// They all indicate that the layout of the source does not match the
/// configuration anymore. Anomalies in the content of a cell are never errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExtractionError {
    #[snafu(display("Table {table:?} does not exist in the source"))]
    MissingTable { table: String },

    #[snafu(display("Row {row} is out of range in table {table:?} ({rows} rows)"))]
    RowOutOfRange {
        table: String,
        row: usize,
        rows: usize,
    },

    #[snafu(display(
        "Position ({row}, {column}) in table {table:?} is below the indexing base {base}"
    ))]
    BelowIndexBase {
        table: String,
        row: usize,
        column: usize,
        base: usize,
    },

    #[snafu(display("The {scope} refers to the unknown unit {unit:?}"))]
    UnknownUnit { scope: String, unit: String },

    #[snafu(display("District {district:?} is missing from the district order"))]
    UnknownDistrict { district: String },

    #[snafu(display("Invalid layout for table {table:?}: {message}"))]
    InvalidLayout { table: String, message: String },

    #[snafu(display("Cannot build a pattern from {pattern:?}"))]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_cell_types() {
        assert_eq!(RawCellValue::infer(""), RawCellValue::Absent);
        assert_eq!(RawCellValue::infer("  "), RawCellValue::Absent);
        assert_eq!(RawCellValue::infer("42"), RawCellValue::Int(42));
        assert_eq!(RawCellValue::infer("879.676"), RawCellValue::Real(879.676));
        assert_eq!(
            RawCellValue::infer("1,234"),
            RawCellValue::Text("1,234".to_string())
        );
        assert_eq!(
            RawCellValue::infer("2 1 3"),
            RawCellValue::Text("2 1 3".to_string())
        );
        assert_eq!(
            RawCellValue::infer("1e5"),
            RawCellValue::Text("1e5".to_string())
        );
    }

    #[test]
    fn labels_drop_alignment_spaces() {
        let v = RawCellValue::Text("合\u{3000}計 ".to_string());
        assert_eq!(v.label(), "合計");
        assert_eq!(RawCellValue::Int(3).label(), "");
        assert!(RawCellValue::Text(" \u{3000}".to_string()).is_absent());
    }
}
