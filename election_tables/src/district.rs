//! The district side of an election: reading the per-unit tables and merging
//! the units into electoral districts.

use log::{debug, info};
use snafu::{ensure, OptionExt};

use crate::cells::{parse_capacity, parse_votes_with};
use crate::config::*;
use crate::grid::{GridSource, GridView};
use crate::header::{read_figures, resolve_columns};
use crate::party::PartyNames;
use crate::tally::{Coverage, PartyTally};

/// Maps base units to the district they belong to. Units without an entry
/// form a district of their own, under their own name.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MergeTable {
    entries: Vec<(String, String)>,
}

impl MergeTable {
    pub fn new(entries: &[(String, String)]) -> MergeTable {
        MergeTable {
            entries: entries.to_vec(),
        }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn district_of<'a>(&'a self, unit: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(u, _)| u == unit)
            .map(|(_, d)| d.as_str())
            .unwrap_or(unit)
    }

    /// The districts in the order of their first member unit.
    pub fn district_order(&self, units: &[String]) -> Vec<String> {
        let mut res: Vec<String> = Vec::new();
        for u in units.iter() {
            let d = self.district_of(u);
            if !res.iter().any(|x| x == d) {
                res.push(d.to_string());
            }
        }
        res
    }
}

/// The figures read for one row of the district-side tables.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct UnitFigures {
    pub name: String,
    pub capacity: u32,
    pub valid_votes: u64,
    pub parties: PartyTally,
}

impl UnitFigures {
    pub fn new(name: &str) -> UnitFigures {
        UnitFigures {
            name: name.to_string(),
            ..Default::default()
        }
    }

    // The first non-zero finding of a figure is kept.
    fn fill_zero(&mut self, other: &UnitFigures) {
        if self.capacity == 0 {
            self.capacity = other.capacity;
        }
        if self.valid_votes == 0 {
            self.valid_votes = other.valid_votes;
        }
        self.parties.fill_zero_all(&other.parties);
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ElectoralDistrict {
    pub name: String,
    pub members: Vec<String>,
    pub capacity: u32,
    pub valid_votes: u64,
    pub parties: PartyTally,
}

/// Sums the units into their districts.
///
/// The districts come out in the given order; a district of the order without
/// any unit is skipped. Every unit must belong to a district of the order.
pub fn merge_districts(
    units: &[UnitFigures],
    merge: &MergeTable,
    order: &[String],
) -> Vec<ElectoralDistrict> {
    let mut res: Vec<ElectoralDistrict> = Vec::new();
    for d in order.iter() {
        let members: Vec<&UnitFigures> = units
            .iter()
            .filter(|u| merge.district_of(&u.name) == d)
            .collect();
        if members.is_empty() {
            debug!("merge_districts: district {:?} has no unit", d);
            continue;
        }
        let mut parties = PartyTally::new();
        for u in members.iter() {
            parties.add_all(&u.parties);
        }
        res.push(ElectoralDistrict {
            name: d.clone(),
            members: members.iter().map(|u| u.name.clone()).collect(),
            capacity: members
                .iter()
                .fold(0u32, |acc, u| acc.saturating_add(u.capacity)),
            valid_votes: members
                .iter()
                .fold(0u64, |acc, u| acc.saturating_add(u.valid_votes)),
            parties,
        });
    }
    res
}

/// The checked district order of a layout.
fn checked_order(units: &[String], layout: &DistrictLayout) -> ExtractionResult<Vec<String>> {
    for (u, _) in layout.merge_table.entries().iter() {
        ensure!(
            units.contains(u),
            UnknownUnitSnafu {
                scope: "merge table",
                unit: u,
            }
        );
    }
    let order = match &layout.district_order {
        Some(o) => o.clone(),
        None => layout.merge_table.district_order(units),
    };
    for u in units.iter() {
        let d = layout.merge_table.district_of(u);
        ensure!(
            order.iter().any(|x| x == d),
            UnknownDistrictSnafu { district: d }
        );
    }
    Ok(order)
}

// Reads the figure of one table in one row.
fn read_row(
    view: &GridView,
    row: usize,
    name: &str,
    table: &UnitTable,
    columns: &[PartyColumn],
) -> ExtractionResult<UnitFigures> {
    let mut res = UnitFigures::new(name);
    match &table.figure {
        UnitFigure::Capacity { column } => {
            res.capacity = parse_capacity(&view.cell(row, *column)?);
        }
        UnitFigure::ValidVotes { columns } => {
            for c in columns.iter() {
                let v = parse_votes_with(&view.cell(row, *c)?, table.notation);
                if v > 0 {
                    res.valid_votes = v;
                    break;
                }
            }
        }
        UnitFigure::Seats { .. } => {
            res.parties = read_figures(
                view,
                row,
                columns,
                PartyFigure::Seats,
                0,
                table.notation,
            )?;
        }
        UnitFigure::Votes { value_offset, .. } => {
            res.parties = read_figures(
                view,
                row,
                columns,
                PartyFigure::Votes,
                *value_offset,
                table.notation,
            )?;
        }
    }
    debug!("read_row: {:?} row {}: {:?}", view.table(), row, res);
    Ok(res)
}

fn record_coverage(coverage: &mut Coverage, figure: &UnitFigure, figures: &UnitFigures) {
    let kind = match figure {
        UnitFigure::Seats { .. } => PartyFigure::Seats,
        UnitFigure::Votes { .. } => PartyFigure::Votes,
        _ => return,
    };
    coverage.record_source(kind);
    for (p, _) in figures.parties.iter() {
        coverage.record(kind, p);
    }
}

/// Reads all the district-side tables and builds the electoral districts.
pub fn extract_districts(
    source: &dyn GridSource,
    units: &[String],
    parties: &PartyNames,
    base: IndexBase,
    layout: &DistrictLayout,
) -> ExtractionResult<(Vec<ElectoralDistrict>, Coverage)> {
    let order = checked_order(units, layout)?;
    let mut unit_figures: Vec<UnitFigures> = units.iter().map(|u| UnitFigures::new(u)).collect();
    // The figures stated for the districts themselves.
    let mut overlay: Vec<UnitFigures> = order.iter().map(|d| UnitFigures::new(d)).collect();
    let mut coverage = Coverage::default();

    for table in layout.tables.iter() {
        info!("extract_districts: reading table {:?}", table.table);
        let view = GridView::open(source, &table.table, base)?;
        let columns = match &table.figure {
            UnitFigure::Seats { columns } | UnitFigure::Votes { columns, .. } => {
                resolve_columns(&view, columns, parties)?
            }
            _ => vec![],
        };
        let keys: &[String] = match table.keyed_by {
            RowKeying::Units => units,
            RowKeying::Districts => &order,
        };
        for (idx, key) in keys.iter().enumerate() {
            let figures = read_row(&view, table.first_row + idx, key, table, &columns)?;
            record_coverage(&mut coverage, &table.figure, &figures);
            match table.keyed_by {
                RowKeying::Units => unit_figures[idx].fill_zero(&figures),
                RowKeying::Districts => overlay[idx].fill_zero(&figures),
            }
        }
        for (d, row) in table.restated_rows.iter() {
            let idx = order
                .iter()
                .position(|x| x == d)
                .context(UnknownDistrictSnafu { district: d })?;
            let figures = read_row(&view, *row, d, table, &columns)?;
            record_coverage(&mut coverage, &table.figure, &figures);
            overlay[idx].fill_zero(&figures);
        }
    }

    let mut districts = merge_districts(&unit_figures, &layout.merge_table, &order);
    for d in districts.iter_mut() {
        if let Some(o) = overlay.iter().find(|o| o.name == d.name) {
            if o.capacity > 0 {
                d.capacity = o.capacity;
            }
            if o.valid_votes > 0 {
                d.valid_votes = o.valid_votes;
            }
            d.parties.replace_nonzero_all(&o.parties);
        }
        if d.valid_votes == 0 {
            d.valid_votes = d.parties.total_votes();
            debug!(
                "extract_districts: {:?}: no valid votes in the sources, using the sum of the party votes: {}",
                d.name, d.valid_votes
            );
        }
    }
    Ok((districts, coverage))
}
