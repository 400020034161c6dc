//! The proportional side of an election: the figures of each block.
//!
//! A block collects its figures from several kinds of tables. The same
//! figure is often restated by more than one table (a block total in a
//! summary table and in a ranking table, for instance): the figures of the
//! tables are merged by keeping the largest value, never added.

use log::{debug, info};
use regex::Regex;
use snafu::{ensure, ResultExt};

use crate::cells::*;
use crate::config::*;
use crate::grid::{GridSource, GridView};
use crate::header::{read_figures, resolve_columns};
use crate::party::PartyNames;
use crate::tally::{Coverage, PartyTally};

#[derive(PartialEq, Debug, Clone)]
pub struct Block {
    pub name: String,
    pub members: Vec<String>,
    pub total_seats: u32,
    pub total_votes: u64,
    pub parties: PartyTally,
}

impl Block {
    fn new(spec: &BlockSpec) -> Block {
        Block {
            name: spec.name.clone(),
            members: spec.members.clone(),
            total_seats: 0,
            total_votes: 0,
            parties: PartyTally::new(),
        }
    }
}

// The text of a cell without any whitespace, numbers included.
fn compact(v: &RawCellValue) -> String {
    v.display_text()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

// Every party with a column in a table is reported by it, even with a zero.
fn record_tally(coverage: &mut Coverage, figure: PartyFigure, tally: &PartyTally) {
    coverage.record_source(figure);
    for (p, _) in tally.iter() {
        coverage.record(figure, p);
    }
}

/// The block selected by the label columns of a row, if any.
fn detect_block(label: &str, blocks: &[BlockSpec]) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    blocks.iter().position(|b| {
        b.detection_labels()
            .iter()
            .any(|l| !l.is_empty() && label.contains(l.as_str()))
    })
}

/// Whether a row of a summary table holds the totals of its block.
///
/// The blocks made of a single unit have no total row: the row of their only
/// unit is the total, as long as it is not a sub-header.
fn is_total_row(marker: &str, block: &BlockSpec, summary: &SummaryTable) -> bool {
    if marker.contains(summary.total_marker.as_str()) {
        return true;
    }
    block.members.len() == 1
        && !marker.is_empty()
        && !summary
            .subheader_markers
            .iter()
            .any(|m| marker.contains(m.as_str()))
}

fn read_summary(
    view: &GridView,
    summary: &SummaryTable,
    specs: &[BlockSpec],
    parties: &PartyNames,
    blocks: &mut [Block],
    quotas: &mut [u32],
    coverage: &mut Coverage,
) -> ExtractionResult<()> {
    let columns = resolve_columns(view, &summary.columns, parties)?;
    coverage.record_source(summary.figure);
    let mut current: Option<usize> = None;
    for row in view.row_range(summary.first_row, summary.last_row)? {
        let mut label = String::new();
        for c in summary.label_columns.iter() {
            label.push_str(&compact(&view.cell(row, *c)?));
        }
        if let Some(idx) = detect_block(&label, specs) {
            current = Some(idx);
        }
        let idx = match current {
            Some(idx) => idx,
            None => continue,
        };
        let marker = compact(&view.cell(row, summary.marker_column)?);
        if !is_total_row(&marker, &specs[idx], summary) {
            continue;
        }
        debug!(
            "read_summary: {:?} row {}: total row of block {:?}",
            view.table(),
            row,
            specs[idx].name
        );
        let tally = read_figures(
            view,
            row,
            &columns,
            summary.figure,
            summary.value_offset,
            summary.notation,
        )?;
        record_tally(coverage, summary.figure, &tally);
        blocks[idx].parties.merge_max_all(&tally);
        if let Some(c) = summary.total_votes_column {
            let v = parse_votes_with(&view.cell(row, c)?, summary.notation);
            blocks[idx].total_votes = blocks[idx].total_votes.max(v);
        }
        if let Some(c) = summary.quota_column {
            quotas[idx] = quotas[idx].max(parse_capacity(&view.cell(row, c)?));
        }
    }
    Ok(())
}

fn read_ranking(
    view: &GridView,
    ranking: &RankingTable,
    parties: &PartyNames,
    block: &mut Block,
    coverage: &mut Coverage,
) -> ExtractionResult<()> {
    let mut tally = PartyTally::new();
    let total_label = parties.normalize(&ranking.total_label);
    for row in view.row_range(ranking.first_row, ranking.last_row)? {
        for group in ranking.groups.iter() {
            let name = parties.normalize(&view.cell(row, group.party_column)?.display_text());
            if name.is_empty() {
                continue;
            }
            let votes = parse_votes_with(&view.cell(row, group.votes_column)?, ranking.notation);
            if name == total_label {
                block.total_votes = block.total_votes.max(votes);
                continue;
            }
            if !view.cell(row, group.rank_column)?.is_numeric() {
                continue;
            }
            let rate = match group.rate_column {
                Some(c) => parse_rate(&view.cell(row, c)?),
                None => 0.0,
            };
            let f = tally.entry(&parties.canonical(&name));
            f.votes = votes;
            f.rate = rate;
        }
    }
    debug!("read_ranking: {:?}: {:?}", view.table(), tally);
    record_tally(coverage, PartyFigure::Votes, &tally);
    block.parties.merge_max_all(&tally);
    Ok(())
}

/// The pattern of an elected count, such as `3人`.
fn elected_pattern(suffix: &str) -> ExtractionResult<Regex> {
    Regex::new(&format!(r"([0-9]+)\s*{}", regex::escape(suffix))).context(InvalidPatternSnafu {
        pattern: suffix,
    })
}

fn read_details(
    source: &dyn GridSource,
    details: &DetailTables,
    parties: &PartyNames,
    base: IndexBase,
    block: &mut Block,
    coverage: &mut Coverage,
) -> ExtractionResult<()> {
    let elected = elected_pattern(&details.elected_suffix)?;
    let discovery = ColumnDiscovery::LabelInRow(LabelScan {
        header_row: details.header_row,
        window: details.window,
    });
    for table in details.tables.iter() {
        let view = GridView::open(source, table, base)?;
        let columns = resolve_columns(&view, &discovery, parties)?;
        let mut tally = PartyTally::new();
        for column in columns.iter() {
            let f = tally.entry(&column.party);
            for col in column.start_column..=column.end_column() {
                if let Some(row) = details.seats_row {
                    let text = normalize_digits(&view.cell(row, col)?.display_text());
                    if f.seats == 0 {
                        if let Some(m) = elected.captures(&text) {
                            f.seats = m[1].parse::<u32>().unwrap_or(0);
                        }
                    }
                }
                if let Some(row) = details.votes_row {
                    let cell = view.cell(row, col)?;
                    if f.votes == 0 && holds_number(&cell) {
                        f.votes = parse_votes_with(&cell, details.notation);
                    }
                }
            }
        }
        debug!("read_details: {:?}: {:?}", table, tally);
        if details.seats_row.is_some() {
            record_tally(coverage, PartyFigure::Seats, &tally);
        }
        if details.votes_row.is_some() {
            record_tally(coverage, PartyFigure::Votes, &tally);
        }
        block.parties.merge_max_all(&tally);
    }
    Ok(())
}

fn read_party_row(
    view: &GridView,
    party_row: &PartyRowTable,
    parties: &PartyNames,
    block: &mut Block,
    coverage: &mut Coverage,
) -> ExtractionResult<()> {
    let columns = resolve_columns(view, &party_row.columns, parties)?;
    let tally = read_figures(
        view,
        party_row.row,
        &columns,
        party_row.figure,
        party_row.value_offset,
        party_row.notation,
    )?;
    record_tally(coverage, party_row.figure, &tally);
    block.parties.merge_max_all(&tally);
    Ok(())
}

/// Reads all the proportional tables and builds the blocks, in the order of
/// the configuration.
pub fn aggregate_blocks(
    source: &dyn GridSource,
    units: &[String],
    parties: &PartyNames,
    base: IndexBase,
    layout: &ProportionalLayout,
) -> ExtractionResult<(Vec<Block>, Coverage)> {
    for spec in layout.blocks.iter() {
        for m in spec.members.iter() {
            ensure!(
                units.contains(m),
                UnknownUnitSnafu {
                    scope: format!("block {}", spec.name),
                    unit: m,
                }
            );
        }
    }
    let mut blocks: Vec<Block> = layout.blocks.iter().map(Block::new).collect();
    let mut quotas: Vec<u32> = vec![0; blocks.len()];
    let mut coverage = Coverage::default();

    for summary in layout.summaries.iter() {
        info!("aggregate_blocks: reading summary table {:?}", summary.table);
        let view = GridView::open(source, &summary.table, base)?;
        read_summary(
            &view,
            summary,
            &layout.blocks,
            parties,
            &mut blocks,
            &mut quotas,
            &mut coverage,
        )?;
    }

    for (spec, block) in layout.blocks.iter().zip(blocks.iter_mut()) {
        for table in spec.tables.iter() {
            match table {
                BlockTable::Ranking(ranking) => {
                    info!("aggregate_blocks: {}: ranking table {:?}", spec.name, ranking.table);
                    let view = GridView::open(source, &ranking.table, base)?;
                    read_ranking(&view, ranking, parties, block, &mut coverage)?;
                }
                BlockTable::PartyDetail(details) => {
                    info!("aggregate_blocks: {}: detail tables {:?}", spec.name, details.tables);
                    read_details(source, details, parties, base, block, &mut coverage)?;
                }
                BlockTable::PartyRow(party_row) => {
                    info!("aggregate_blocks: {}: party row in {:?}", spec.name, party_row.table);
                    let view = GridView::open(source, &party_row.table, base)?;
                    read_party_row(&view, party_row, parties, block, &mut coverage)?;
                }
            }
        }
    }

    for ((spec, block), quota) in layout.blocks.iter().zip(blocks.iter_mut()).zip(quotas) {
        if block.total_votes == 0 {
            block.total_votes = block.parties.total_votes();
            debug!(
                "aggregate_blocks: {}: no total votes in the sources, using the sum of the party votes: {}",
                block.name, block.total_votes
            );
        }
        block.total_seats = match spec.total_seats {
            Some(s) => s,
            None if quota > 0 => quota,
            None => {
                let s = block.parties.total_seats();
                info!(
                    "aggregate_blocks: {}: no quota configured or found, using the elected count: {}",
                    block.name, s
                );
                s
            }
        };
    }
    Ok((blocks, coverage))
}
