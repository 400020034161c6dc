//! Finding the columns of the parties in a table, and reading their figures.

use log::debug;
use snafu::ensure;

use crate::cells::{parse_count, parse_rate, parse_votes_with};
use crate::config::*;
use crate::grid::GridView;
use crate::party::{clean_label, PartyNames};
use crate::tally::{PartyFigures, PartyTally};

/// The party columns of a table, in the order of the header.
pub fn resolve_columns(
    view: &GridView,
    discovery: &ColumnDiscovery,
    parties: &PartyNames,
) -> ExtractionResult<Vec<PartyColumn>> {
    let res = match discovery {
        ColumnDiscovery::Fixed(cols) => cols
            .iter()
            .map(|c| PartyColumn::new(&parties.normalize(&c.party), c.start_column, c.span))
            .collect(),
        ColumnDiscovery::FixedStride(scan) => stride_scan(view, scan, parties)?,
        ColumnDiscovery::LabelInRow(scan) => label_scan(view, scan, parties)?,
    };
    debug!("resolve_columns: table {:?}: {:?}", view.table(), res);
    Ok(res)
}

fn stride_scan(
    view: &GridView,
    scan: &StrideScan,
    parties: &PartyNames,
) -> ExtractionResult<Vec<PartyColumn>> {
    ensure!(
        scan.stride > 0,
        InvalidLayoutSnafu {
            table: view.table(),
            message: "the stride of a header scan must be positive",
        }
    );
    let excluded: Vec<String> = scan.excluded.iter().map(|s| clean_label(s)).collect();
    let mut res: Vec<PartyColumn> = Vec::new();
    let mut col = scan.first_column;
    while col <= scan.last_column {
        let label = view.cell(scan.header_row, col)?.label();
        if label.is_empty() || excluded.contains(&clean_label(&label)) {
            col += 1;
            continue;
        }
        res.push(PartyColumn::new(
            &parties.canonical(&label),
            col,
            scan.stride,
        ));
        col += scan.stride;
    }
    Ok(res)
}

fn label_scan(
    view: &GridView,
    scan: &LabelScan,
    parties: &PartyNames,
) -> ExtractionResult<Vec<PartyColumn>> {
    let mut res: Vec<PartyColumn> = Vec::new();
    let last = match view.last_column() {
        Some(c) => c,
        None => return Ok(res),
    };
    for col in view.first_column()..=last {
        let cell = view.cell(scan.header_row, col)?;
        if let Some(p) = parties.match_known(&cell.label()) {
            res.push(PartyColumn::new(p, col, scan.window));
        }
    }
    Ok(res)
}

/// The elected count of a party in one row: the last non-zero cell of the
/// span, since the subtotal is always rightmost.
pub fn seats_in_span(view: &GridView, row: usize, column: &PartyColumn) -> ExtractionResult<u32> {
    for col in (column.start_column..=column.end_column()).rev() {
        let v = parse_count(&view.cell(row, col)?);
        if v > 0 {
            return Ok(v);
        }
    }
    Ok(0)
}

/// Reads one figure for every party column of a row. Columns of the same
/// party describe distinct candidates (for instance endorsed and plain
/// independents) and are added.
pub fn read_figures(
    view: &GridView,
    row: usize,
    columns: &[PartyColumn],
    figure: PartyFigure,
    value_offset: usize,
    notation: VoteNotation,
) -> ExtractionResult<PartyTally> {
    let mut tally = PartyTally::new();
    for column in columns.iter() {
        let figures = match figure {
            PartyFigure::Seats => PartyFigures::seats(seats_in_span(view, row, column)?),
            PartyFigure::Votes => {
                let cell = view.cell(row, column.start_column + value_offset)?;
                PartyFigures::votes(parse_votes_with(&cell, notation))
            }
            PartyFigure::Rate => {
                let cell = view.cell(row, column.start_column + value_offset)?;
                PartyFigures {
                    rate: parse_rate(&cell),
                    ..Default::default()
                }
            }
        };
        tally.entry(&column.party).add(&figures);
    }
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{MemoryGrid, Workbook};

    fn parties() -> PartyNames {
        PartyNames::new(
            &[
                "自由民主党".to_string(),
                "立憲民主党".to_string(),
                "公明党".to_string(),
            ],
            &[],
        )
    }

    fn seats_table() -> Workbook {
        Workbook::new().with_table(
            "Table 14",
            MemoryGrid::from_text(&[
                &[
                    "都道府県", "定数", "自由民主党", "", "", "立憲民主党", "", "", "合計", "", "",
                    "無所属",
                ],
                &["", "", "新", "前", "計", "新", "前", "計", "", "", "", "計"],
                &["北海道", "12", "", "2", "2", "1 2 3", "", "", "", "", "", "1"],
            ]),
        )
    }

    #[test]
    fn fixed_stride_scan() {
        let wb = seats_table();
        let v = GridView::open(&wb, "Table 14", IndexBase::One).unwrap();
        let scan = ColumnDiscovery::FixedStride(StrideScan {
            header_row: 1,
            first_column: 3,
            last_column: 12,
            stride: 3,
            excluded: vec!["合　計".to_string()],
        });
        let cols = resolve_columns(&v, &scan, &parties()).unwrap();
        assert_eq!(
            cols,
            vec![
                PartyColumn::new("自由民主党", 3, 3),
                PartyColumn::new("立憲民主党", 6, 3),
                PartyColumn::new("無所属", 12, 3),
            ]
        );
        let t = read_figures(&v, 3, &cols, PartyFigure::Seats, 0, VoteNotation::Grouped).unwrap();
        assert_eq!(t.get("自由民主党").unwrap().seats, 2);
        // Merged run in the first sub-column, blank subtotal columns.
        assert_eq!(t.get("立憲民主党").unwrap().seats, 3);
        assert_eq!(t.get("無所属").unwrap().seats, 1);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let wb = seats_table();
        let v = GridView::open(&wb, "Table 14", IndexBase::One).unwrap();
        let scan = ColumnDiscovery::FixedStride(StrideScan {
            header_row: 1,
            first_column: 3,
            last_column: 12,
            stride: 0,
            excluded: vec![],
        });
        assert!(matches!(
            resolve_columns(&v, &scan, &parties()),
            Err(ExtractionError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn label_in_row_scan() {
        let wb = Workbook::new().with_table(
            "Table 41",
            MemoryGrid::from_text(&[
                &["", "自由民主党　※1", "", "", "公明党（届出）", "", "諸派"],
                &["得票数", "1,000,000", "", "", "500,000", "", ""],
            ]),
        );
        let v = GridView::open(&wb, "Table 41", IndexBase::Zero).unwrap();
        let scan = ColumnDiscovery::LabelInRow(LabelScan {
            header_row: 0,
            window: 10,
        });
        let cols = resolve_columns(&v, &scan, &parties()).unwrap();
        assert_eq!(
            cols,
            vec![
                PartyColumn::new("自由民主党", 1, 10),
                PartyColumn::new("公明党", 4, 10),
            ]
        );
    }

    #[test]
    fn votes_at_offset() {
        let wb = Workbook::new().with_table(
            "Table 21",
            MemoryGrid::from_text(&[
                &["", "自由民主党", "", "", "無所属", "", ""],
                &["北海道", "100", "200", "300", "10", "", "879.676"],
            ]),
        );
        let v = GridView::open(&wb, "Table 21", IndexBase::Zero).unwrap();
        let cols = vec![
            PartyColumn::new("自由民主党", 1, 3),
            PartyColumn::new("無所属", 4, 3),
        ];
        let t = read_figures(&v, 1, &cols, PartyFigure::Votes, 2, VoteNotation::Grouped).unwrap();
        assert_eq!(t.get("自由民主党").unwrap().votes, 300);
        assert_eq!(t.get("無所属").unwrap().votes, 879676);
    }
}
