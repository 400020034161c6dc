use crate::extract::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    pub year: u32,
    #[serde(rename = "electionDate")]
    pub election_date: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// Workbooks: prepended to the names of the worksheets.
    pub prefix: Option<String>,
    /// CSV files: the name of the table. Defaults to the name of the file.
    #[serde(rename = "tableId")]
    pub table_id: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PartyAlias {
    pub from: String,
    pub to: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PartySettings {
    pub known: Vec<String>,
    pub aliases: Option<Vec<PartyAlias>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FixedColumnSettings {
    pub party: String,
    pub column: JSValue,
    pub span: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsSettings {
    pub strategy: String,
    pub columns: Option<Vec<FixedColumnSettings>>,
    #[serde(rename = "headerRow")]
    pub header_row: Option<JSValue>,
    #[serde(rename = "firstColumn")]
    pub first_column: Option<JSValue>,
    #[serde(rename = "lastColumn")]
    pub last_column: Option<JSValue>,
    pub stride: Option<usize>,
    pub excluded: Option<Vec<String>>,
    pub window: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RestatedRowSettings {
    pub district: String,
    pub row: JSValue,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct UnitTableSettings {
    pub table: String,
    #[serde(rename = "firstRow")]
    pub first_row: JSValue,
    #[serde(rename = "keyedBy")]
    pub keyed_by: Option<String>,
    #[serde(rename = "restatedRows")]
    pub restated_rows: Option<Vec<RestatedRowSettings>>,
    pub notation: Option<String>,
    pub figure: String,
    pub column: Option<JSValue>,
    pub columns: Option<Vec<JSValue>>,
    #[serde(rename = "partyColumns")]
    pub party_columns: Option<ColumnsSettings>,
    #[serde(rename = "valueOffset")]
    pub value_offset: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MergeEntry {
    pub unit: String,
    pub district: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DistrictSettings {
    #[serde(rename = "mergeTable")]
    pub merge_table: Option<Vec<MergeEntry>>,
    #[serde(rename = "districtOrder")]
    pub district_order: Option<Vec<String>>,
    pub tables: Vec<UnitTableSettings>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RankingGroupSettings {
    #[serde(rename = "rankColumn")]
    pub rank_column: JSValue,
    #[serde(rename = "partyColumn")]
    pub party_column: JSValue,
    #[serde(rename = "votesColumn")]
    pub votes_column: JSValue,
    #[serde(rename = "rateColumn")]
    pub rate_column: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BlockTableSettings {
    pub kind: String,
    pub table: Option<String>,
    pub tables: Option<Vec<String>>,
    #[serde(rename = "firstRow")]
    pub first_row: Option<JSValue>,
    #[serde(rename = "lastRow")]
    pub last_row: Option<JSValue>,
    pub groups: Option<Vec<RankingGroupSettings>>,
    #[serde(rename = "totalLabel")]
    pub total_label: Option<String>,
    #[serde(rename = "headerRow")]
    pub header_row: Option<JSValue>,
    #[serde(rename = "votesRow")]
    pub votes_row: Option<JSValue>,
    #[serde(rename = "seatsRow")]
    pub seats_row: Option<JSValue>,
    pub window: Option<usize>,
    #[serde(rename = "electedSuffix")]
    pub elected_suffix: Option<String>,
    pub row: Option<JSValue>,
    pub figure: Option<String>,
    #[serde(rename = "partyColumns")]
    pub party_columns: Option<ColumnsSettings>,
    #[serde(rename = "valueOffset")]
    pub value_offset: Option<usize>,
    pub notation: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BlockSettings {
    pub name: String,
    #[serde(rename = "totalSeats")]
    pub total_seats: Option<u32>,
    pub members: Vec<String>,
    pub labels: Option<Vec<String>>,
    pub tables: Option<Vec<BlockTableSettings>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummarySettings {
    pub table: String,
    #[serde(rename = "firstRow")]
    pub first_row: JSValue,
    #[serde(rename = "lastRow")]
    pub last_row: Option<JSValue>,
    #[serde(rename = "labelColumns")]
    pub label_columns: Vec<JSValue>,
    #[serde(rename = "markerColumn")]
    pub marker_column: JSValue,
    #[serde(rename = "totalMarker")]
    pub total_marker: Option<String>,
    #[serde(rename = "subheaderMarkers")]
    pub subheader_markers: Option<Vec<String>>,
    pub figure: String,
    #[serde(rename = "partyColumns")]
    pub party_columns: ColumnsSettings,
    #[serde(rename = "valueOffset")]
    pub value_offset: Option<usize>,
    #[serde(rename = "totalVotesColumn")]
    pub total_votes_column: Option<JSValue>,
    #[serde(rename = "quotaColumn")]
    pub quota_column: Option<JSValue>,
    pub notation: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ProportionalSettings {
    pub blocks: Vec<BlockSettings>,
    pub summaries: Option<Vec<SummarySettings>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub sources: Vec<FileSource>,
    /// 0 or 1. Defaults to 1, the convention of the spreadsheets.
    #[serde(rename = "indexBase")]
    pub index_base: Option<u32>,
    pub units: Vec<String>,
    pub parties: PartySettings,
    pub district: Option<DistrictSettings>,
    pub proportional: Option<ProportionalSettings>,
}

/// Reads a row or column position: a number in the indexing base of the
/// configuration, or Excel column letters (`A`, `AK`).
fn read_position(x: &JSValue, base: IndexBase) -> TabResult<usize> {
    match x {
        JSValue::Number(n) => n.as_u64().map(|x| x as usize).context(ParsingPositionSnafu {
            value: n.to_string(),
        }),
        // Parsing the Excel-style columns
        JSValue::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            let mut idx: usize = 0;
            for c in s.to_ascii_uppercase().chars() {
                idx = idx
                    .checked_mul(26)
                    .and_then(|x| x.checked_add(c as usize - 'A' as usize + 1))
                    .context(ParsingPositionSnafu { value: s.clone() })?;
            }
            Ok(idx - 1 + base.offset())
        }
        JSValue::String(s) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingPositionSnafu { value: s.clone() }),
        _ => None::<usize>.context(ParsingPositionSnafu {
            value: x.to_string(),
        }),
    }
}

fn read_opt_position(x: &Option<JSValue>, base: IndexBase) -> TabResult<Option<usize>> {
    match x {
        Some(v) => read_position(v, base).map(Some),
        None => Ok(None),
    }
}

fn required<'a, T>(x: &'a Option<T>, field: &str, table: &str) -> TabResult<&'a T> {
    match x {
        Some(v) => Ok(v),
        None => whatever!("missing field {} for table {}", field, table),
    }
}

fn read_notation(x: &Option<String>) -> TabResult<VoteNotation> {
    match x.as_deref() {
        None | Some("grouped") => Ok(VoteNotation::Grouped),
        Some("decimal") => Ok(VoteNotation::Decimal),
        Some(n) => whatever!("unknown vote notation: {}", n),
    }
}

fn read_figure(x: &str) -> TabResult<PartyFigure> {
    match x {
        "seats" => Ok(PartyFigure::Seats),
        "votes" => Ok(PartyFigure::Votes),
        "rates" => Ok(PartyFigure::Rate),
        _ => whatever!("unknown figure: {}", x),
    }
}

fn validate_columns(
    cs: &ColumnsSettings,
    table: &str,
    base: IndexBase,
) -> TabResult<ColumnDiscovery> {
    match cs.strategy.as_str() {
        "fixed" => {
            let mut res: Vec<PartyColumn> = Vec::new();
            for c in required(&cs.columns, "columns", table)?.iter() {
                res.push(PartyColumn::new(
                    &c.party,
                    read_position(&c.column, base)?,
                    c.span.unwrap_or(1),
                ));
            }
            Ok(ColumnDiscovery::Fixed(res))
        }
        "stride" => Ok(ColumnDiscovery::FixedStride(StrideScan {
            header_row: read_position(required(&cs.header_row, "headerRow", table)?, base)?,
            first_column: read_position(required(&cs.first_column, "firstColumn", table)?, base)?,
            last_column: read_position(required(&cs.last_column, "lastColumn", table)?, base)?,
            stride: *required(&cs.stride, "stride", table)?,
            excluded: cs.excluded.clone().unwrap_or_default(),
        })),
        "labels" => Ok(ColumnDiscovery::LabelInRow(LabelScan {
            header_row: read_position(required(&cs.header_row, "headerRow", table)?, base)?,
            window: cs.window.unwrap_or(DEFAULT_WINDOW),
        })),
        x => whatever!("unknown column strategy {:?} for table {}", x, table),
    }
}

fn validate_unit_table(ut: &UnitTableSettings, base: IndexBase) -> TabResult<UnitTable> {
    let t = ut.table.as_str();
    let keyed_by = match ut.keyed_by.as_deref() {
        None | Some("units") => RowKeying::Units,
        Some("districts") => RowKeying::Districts,
        Some(x) => whatever!("unknown row keying {:?} for table {}", x, t),
    };
    let mut restated_rows: Vec<(String, usize)> = Vec::new();
    for r in ut.restated_rows.clone().unwrap_or_default().iter() {
        restated_rows.push((r.district.clone(), read_position(&r.row, base)?));
    }
    let figure = match ut.figure.as_str() {
        "capacity" => UnitFigure::Capacity {
            column: read_position(required(&ut.column, "column", t)?, base)?,
        },
        "validVotes" => {
            let mut columns: Vec<usize> = Vec::new();
            for c in required(&ut.columns, "columns", t)?.iter() {
                columns.push(read_position(c, base)?);
            }
            UnitFigure::ValidVotes { columns }
        }
        "seats" => UnitFigure::Seats {
            columns: validate_columns(required(&ut.party_columns, "partyColumns", t)?, t, base)?,
        },
        "votes" => UnitFigure::Votes {
            columns: validate_columns(required(&ut.party_columns, "partyColumns", t)?, t, base)?,
            value_offset: ut.value_offset.unwrap_or(0),
        },
        x => whatever!("unknown district figure {:?} for table {}", x, t),
    };
    Ok(UnitTable {
        table: ut.table.clone(),
        first_row: read_position(&ut.first_row, base)?,
        keyed_by,
        restated_rows,
        notation: read_notation(&ut.notation)?,
        figure,
    })
}

fn validate_block_table(bt: &BlockTableSettings, block: &str, base: IndexBase) -> TabResult<BlockTable> {
    match bt.kind.as_str() {
        "ranking" => {
            let t = required(&bt.table, "table", block)?;
            let mut groups: Vec<RankingColumns> = Vec::new();
            for g in required(&bt.groups, "groups", t)?.iter() {
                groups.push(RankingColumns {
                    rank_column: read_position(&g.rank_column, base)?,
                    party_column: read_position(&g.party_column, base)?,
                    votes_column: read_position(&g.votes_column, base)?,
                    rate_column: read_opt_position(&g.rate_column, base)?,
                });
            }
            Ok(BlockTable::Ranking(RankingTable {
                table: t.clone(),
                first_row: read_position(required(&bt.first_row, "firstRow", t)?, base)?,
                last_row: read_opt_position(&bt.last_row, base)?,
                groups,
                total_label: bt
                    .total_label
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TOTAL_LABEL.to_string()),
                notation: read_notation(&bt.notation)?,
            }))
        }
        "partyDetail" => {
            let tables = required(&bt.tables, "tables", block)?;
            Ok(BlockTable::PartyDetail(DetailTables {
                tables: tables.clone(),
                header_row: read_position(required(&bt.header_row, "headerRow", block)?, base)?,
                votes_row: read_opt_position(&bt.votes_row, base)?,
                seats_row: read_opt_position(&bt.seats_row, base)?,
                window: bt.window.unwrap_or(DEFAULT_WINDOW),
                elected_suffix: bt
                    .elected_suffix
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ELECTED_SUFFIX.to_string()),
                notation: read_notation(&bt.notation)?,
            }))
        }
        "partyRow" => {
            let t = required(&bt.table, "table", block)?;
            Ok(BlockTable::PartyRow(PartyRowTable {
                table: t.clone(),
                row: read_position(required(&bt.row, "row", t)?, base)?,
                figure: read_figure(required(&bt.figure, "figure", t)?)?,
                columns: validate_columns(required(&bt.party_columns, "partyColumns", t)?, t, base)?,
                value_offset: bt.value_offset.unwrap_or(0),
                notation: read_notation(&bt.notation)?,
            }))
        }
        x => whatever!("unknown table kind {:?} in block {}", x, block),
    }
}

fn validate_summary(s: &SummarySettings, base: IndexBase) -> TabResult<SummaryTable> {
    let mut label_columns: Vec<usize> = Vec::new();
    for c in s.label_columns.iter() {
        label_columns.push(read_position(c, base)?);
    }
    let figure = read_figure(&s.figure)?;
    if figure == PartyFigure::Rate {
        whatever!("summary table {} cannot hold vote rates", s.table);
    }
    Ok(SummaryTable {
        table: s.table.clone(),
        first_row: read_position(&s.first_row, base)?,
        last_row: read_opt_position(&s.last_row, base)?,
        label_columns,
        marker_column: read_position(&s.marker_column, base)?,
        total_marker: s
            .total_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_TOTAL_MARKER.to_string()),
        subheader_markers: s.subheader_markers.clone().unwrap_or_default(),
        figure,
        columns: validate_columns(&s.party_columns, &s.table, base)?,
        value_offset: s.value_offset.unwrap_or(0),
        total_votes_column: read_opt_position(&s.total_votes_column, base)?,
        quota_column: read_opt_position(&s.quota_column, base)?,
        notation: read_notation(&s.notation)?,
    })
}

/// Turns the settings read from the JSON file into the configuration of the extraction.
pub fn validate_config(settings: &ExtractionSettings) -> TabResult<ExtractionConfig> {
    let base = match settings.index_base {
        None | Some(1) => IndexBase::One,
        Some(0) => IndexBase::Zero,
        Some(x) => whatever!("the index base must be 0 or 1, not {}", x),
    };
    if settings.units.is_empty() {
        whatever!("no unit in the configuration");
    }
    let aliases: Vec<(String, String)> = settings
        .parties
        .aliases
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|a| (a.from, a.to))
        .collect();

    let district = match &settings.district {
        Some(ds) => {
            let merge: Vec<(String, String)> = ds
                .merge_table
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(|m| (m.unit, m.district))
                .collect();
            let mut tables: Vec<UnitTable> = Vec::new();
            for ut in ds.tables.iter() {
                tables.push(validate_unit_table(ut, base)?);
            }
            Some(DistrictLayout {
                merge_table: MergeTable::new(&merge),
                district_order: ds.district_order.clone(),
                tables,
            })
        }
        None => None,
    };

    let proportional = match &settings.proportional {
        Some(ps) => {
            let mut blocks: Vec<BlockSpec> = Vec::new();
            for b in ps.blocks.iter() {
                let mut tables: Vec<BlockTable> = Vec::new();
                for bt in b.tables.clone().unwrap_or_default().iter() {
                    tables.push(validate_block_table(bt, &b.name, base)?);
                }
                blocks.push(BlockSpec {
                    name: b.name.clone(),
                    total_seats: b.total_seats,
                    members: b.members.clone(),
                    labels: b.labels.clone().unwrap_or_default(),
                    tables,
                });
            }
            let mut summaries: Vec<SummaryTable> = Vec::new();
            for s in ps.summaries.clone().unwrap_or_default().iter() {
                summaries.push(validate_summary(s, base)?);
            }
            Some(ProportionalLayout { blocks, summaries })
        }
        None => None,
    };

    Ok(ExtractionConfig {
        year: settings.output_settings.year,
        election_date: settings.output_settings.election_date.clone(),
        index_base: base,
        units: settings.units.clone(),
        parties: PartyNames::new(&settings.parties.known, &aliases),
        district,
        proportional,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn positions() {
        let one = IndexBase::One;
        assert_eq!(read_position(&json!(4), one).unwrap(), 4);
        assert_eq!(read_position(&json!("12"), one).unwrap(), 12);
        assert_eq!(read_position(&json!("A"), one).unwrap(), 1);
        assert_eq!(read_position(&json!("a"), IndexBase::Zero).unwrap(), 0);
        assert_eq!(read_position(&json!("Z"), one).unwrap(), 26);
        assert_eq!(read_position(&json!("AA"), one).unwrap(), 27);
        assert_eq!(read_position(&json!("AK"), one).unwrap(), 37);
        assert!(matches!(
            read_position(&json!("B2"), one),
            Err(TabError::ParsingPosition { .. })
        ));
        assert!(read_position(&json!(-1), one).is_err());
        assert!(matches!(
            read_position(&json!("Z".repeat(40)), one),
            Err(TabError::ParsingPosition { .. })
        ));
    }

    #[test]
    fn minimal_config() {
        let js = json!({
            "outputSettings": {"year": 2024, "electionDate": "2024-10-27"},
            "sources": [{"provider": "csv", "filePath": "t.csv", "tableId": "Table 1"}],
            "units": ["A", "B"],
            "parties": {"known": ["X"], "aliases": [{"from": "ＸＸ", "to": "X"}]},
            "district": {
                "mergeTable": [{"unit": "A", "district": "AB"}, {"unit": "B", "district": "AB"}],
                "tables": [
                    {"table": "Table 1", "firstRow": 3, "figure": "capacity", "column": "B",
                     "restatedRows": [{"district": "AB", "row": 5}]},
                    {"table": "Table 1", "firstRow": 3, "figure": "seats",
                     "partyColumns": {"strategy": "stride", "headerRow": 1,
                                      "firstColumn": "C", "lastColumn": "K", "stride": 3}}
                ]
            }
        });
        let settings: ExtractionSettings = serde_json::from_value(js).unwrap();
        let config = validate_config(&settings).unwrap();
        assert_eq!(config.index_base, IndexBase::One);
        assert_eq!(config.parties.normalize("ＸＸ"), "X");
        assert!(config.proportional.is_none());
        let d = config.district.unwrap();
        assert_eq!(d.merge_table.district_of("B"), "AB");
        assert_eq!(d.tables[0].figure, UnitFigure::Capacity { column: 2 });
        assert_eq!(d.tables[0].restated_rows, vec![("AB".to_string(), 5)]);
        assert_eq!(
            d.tables[1].figure,
            UnitFigure::Seats {
                columns: ColumnDiscovery::FixedStride(StrideScan {
                    header_row: 1,
                    first_column: 3,
                    last_column: 11,
                    stride: 3,
                    excluded: vec![],
                })
            }
        );
    }

    #[test]
    fn invalid_values() {
        let js = json!({
            "outputSettings": {"year": 2024, "electionDate": "2024-10-27"},
            "sources": [],
            "indexBase": 2,
            "units": ["A"],
            "parties": {"known": []}
        });
        let settings: ExtractionSettings = serde_json::from_value(js).unwrap();
        assert!(validate_config(&settings).is_err());
    }
}
