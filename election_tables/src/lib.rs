mod assemble;
mod block;
mod cells;
mod config;
mod district;
mod grid;
mod header;
pub mod manual;
mod party;
mod result;
mod tally;
mod validate;

use log::{info, warn};

pub use crate::assemble::{assemble_party_results, assemble_result, round2, vote_rate};
pub use crate::block::{aggregate_blocks, Block};
pub use crate::cells::{parse_capacity, parse_count, parse_rate, parse_votes, parse_votes_with};
pub use crate::config::*;
pub use crate::district::{
    extract_districts, merge_districts, ElectoralDistrict, MergeTable, UnitFigures,
};
pub use crate::grid::{CellGrid, GridSource, GridView, MemoryGrid, Workbook};
pub use crate::header::{read_figures, resolve_columns, seats_in_span};
pub use crate::party::{clean_label, PartyNames};
pub use crate::result::*;
pub use crate::tally::{Coverage, PartyFigures, PartyTally};
pub use crate::validate::validate;

/// Extracts one election from its source tables.
///
/// The district and the proportional sides are read independently, then
/// assembled and checked. The warnings of the checks are logged and attached
/// to the result: they never prevent it from being produced.
pub fn run_extraction(
    source: &dyn GridSource,
    config: &ExtractionConfig,
) -> ExtractionResult<ElectionResult> {
    info!(
        "run_extraction: election of {} ({}), {} units, tables: {:?}",
        config.year,
        config.election_date,
        config.units.len(),
        source.table_names()
    );

    let (districts, district_coverage) = match &config.district {
        Some(layout) => extract_districts(
            source,
            &config.units,
            &config.parties,
            config.index_base,
            layout,
        )?,
        None => (vec![], Coverage::default()),
    };
    let (blocks, block_coverage) = match &config.proportional {
        Some(layout) => aggregate_blocks(
            source,
            &config.units,
            &config.parties,
            config.index_base,
            layout,
        )?,
        None => (vec![], Coverage::default()),
    };

    let mut res = assemble_result(config, &districts, &blocks);
    let mut warnings = validate(&res);
    warnings.extend(district_coverage.warnings(Scope::District));
    warnings.extend(block_coverage.warnings(Scope::Block));
    for w in warnings.iter() {
        warn!("{}", w);
    }
    res.warnings = warnings;
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    fn config(capacity_ab: &str) -> (Workbook, ExtractionConfig) {
        let wb = Workbook::new()
            .with_table(
                "Table 1",
                MemoryGrid::from_text(&[
                    &["単位", "定数", "X", "", "有効"],
                    &["", "", "当選", "得票", ""],
                    &["A", "", "0", "1000", ""],
                    &["B", "", "1", "500", ""],
                    &["AB", capacity_ab, "", "", ""],
                ]),
            )
            .with_table(
                "Table 2",
                MemoryGrid::from_text(&[
                    &["", "Y"],
                    &["得票数", "2,000"],
                    &["当選人数", ""],
                ]),
            )
            .with_table(
                "Table 3",
                MemoryGrid::from_text(&[&["", "", "Y"], &["", "", ""], &["", "", "3人"]]),
            );
        let unit_table = |figure: UnitFigure| UnitTable {
            table: "Table 1".to_string(),
            first_row: 3,
            keyed_by: RowKeying::Units,
            restated_rows: vec![],
            notation: VoteNotation::Grouped,
            figure,
        };
        let config = ExtractionConfig {
            year: 2025,
            election_date: "2025-07-20".to_string(),
            index_base: IndexBase::One,
            units: names(&["A", "B"]),
            parties: PartyNames::new(&names(&["X", "Y"]), &[]),
            district: Some(DistrictLayout {
                merge_table: MergeTable::new(&[
                    ("A".to_string(), "AB".to_string()),
                    ("B".to_string(), "AB".to_string()),
                ]),
                district_order: None,
                tables: vec![
                    UnitTable {
                        restated_rows: vec![("AB".to_string(), 5)],
                        ..unit_table(UnitFigure::Capacity { column: 2 })
                    },
                    unit_table(UnitFigure::Seats {
                        columns: ColumnDiscovery::Fixed(vec![PartyColumn::new("X", 3, 1)]),
                    }),
                    unit_table(UnitFigure::Votes {
                        columns: ColumnDiscovery::Fixed(vec![PartyColumn::new("X", 3, 2)]),
                        value_offset: 1,
                    }),
                    unit_table(UnitFigure::ValidVotes { columns: vec![5] }),
                ],
            }),
            proportional: Some(ProportionalLayout {
                blocks: vec![BlockSpec {
                    name: "Y".to_string(),
                    total_seats: None,
                    members: names(&["A", "B"]),
                    labels: vec![],
                    tables: vec![BlockTable::PartyDetail(DetailTables {
                        tables: names(&["Table 2", "Table 3"]),
                        header_row: 1,
                        votes_row: Some(2),
                        seats_row: Some(3),
                        window: DEFAULT_WINDOW,
                        elected_suffix: DEFAULT_ELECTED_SUFFIX.to_string(),
                        notation: VoteNotation::Grouped,
                    })],
                }],
                summaries: vec![],
            }),
        };
        (wb, config)
    }

    #[test]
    fn merged_district_and_block() {
        init();
        let (wb, config) = config("1");
        let res = run_extraction(&wb, &config).unwrap();
        assert!(res.warnings.is_empty(), "{:?}", res.warnings);

        assert_eq!(res.district.total_seats, 1);
        let ab = &res.district.units[0];
        assert_eq!(ab.name, "AB");
        assert_eq!(ab.members, names(&["A", "B"]));
        assert_eq!(
            ab.party_results,
            vec![PartyResult {
                party: "X".to_string(),
                seats: 1,
                total_votes: 1500,
                vote_rate: 100.0,
            }]
        );

        assert_eq!(res.proportional.total_seats, 3);
        let y = &res.proportional.blocks[0];
        assert_eq!((y.total_seats, y.total_votes), (3, 2000));
        assert_eq!(
            y.parties,
            vec![PartyResult {
                party: "Y".to_string(),
                seats: 3,
                total_votes: 2000,
                vote_rate: 100.0,
            }]
        );
    }

    #[test]
    fn capacity_mismatch_is_a_warning() {
        init();
        let (wb, config) = config("2");
        let res = run_extraction(&wb, &config).unwrap();
        assert_eq!(
            res.warnings,
            vec![ValidationWarning::SeatMismatch {
                scope: Scope::District,
                name: "AB".to_string(),
                expected: 2,
                actual: 1,
            }]
        );
        assert_eq!(res.district.units[0].party_results.len(), 1);
    }

    #[test]
    fn missing_tables_abort() {
        init();
        let (_, config) = config("1");
        let wb = Workbook::new();
        assert!(matches!(
            run_extraction(&wb, &config),
            Err(ExtractionError::MissingTable { .. })
        ));
    }
}
