use log::{info, warn};

use election_tables::*;
use snafu::{prelude::*, ErrorCompat, Snafu};

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

use crate::extract::config_reader::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TabError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of CSV file {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error reading JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the result to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot read {value} as a row or column position"))]
    ParsingPosition { value: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("The extraction failed"))]
    Extraction { source: ExtractionError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TabResult<T> = Result<T, TabError>;

fn party_result_to_json(pr: &PartyResult) -> JSValue {
    json!({
        "party": pr.party,
        "seats": pr.seats,
        "totalVotes": pr.total_votes,
        "voteRate": pr.vote_rate,
    })
}

fn result_to_json(res: &ElectionResult) -> JSValue {
    let blocks: Vec<JSValue> = res
        .proportional
        .blocks
        .iter()
        .map(|b| {
            let parties: Vec<JSValue> = b
                .parties
                .iter()
                .map(|pr| {
                    json!({
                        "party": pr.party,
                        "block": b.name,
                        "seats": pr.seats,
                        "totalVotes": pr.total_votes,
                        "voteRate": pr.vote_rate,
                        // Candidate-level results are not extracted.
                        "candidates": [],
                    })
                })
                .collect();
            json!({
                "name": b.name,
                "totalSeats": b.total_seats,
                "totalVotes": b.total_votes,
                "parties": parties,
            })
        })
        .collect();
    let units: Vec<JSValue> = res
        .district
        .units
        .iter()
        .map(|d| {
            let party_results: Vec<JSValue> =
                d.party_results.iter().map(party_result_to_json).collect();
            json!({
                "name": d.name,
                "members": d.members,
                "capacity": d.capacity,
                "validVotes": d.valid_votes,
                "partyResults": party_results,
            })
        })
        .collect();
    json!({
        "year": res.year,
        "electionDate": res.election_date,
        "proportional": {
            "totalSeats": res.proportional.total_seats,
            "blocks": blocks,
        },
        "district": {
            "totalSeats": res.district.total_seats,
            "units": units,
        },
    })
}

pub fn read_summary(path: String) -> TabResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn load_sources(root: &Path, sources: &[FileSource]) -> TabResult<Workbook> {
    if sources.is_empty() {
        whatever!("no source file in the configuration");
    }
    let mut wb = Workbook::new();
    for src in sources.iter() {
        let path = io_common::source_path(root, &src.file_path);
        info!("load_sources: {} source {}", src.provider, path);
        match src.provider.as_str() {
            "excel" | "xlsx" => io_excel::read_excel_tables(&path, src.prefix.as_deref(), &mut wb)?,
            "csv" => {
                let table = match &src.table_id {
                    Some(t) => t.clone(),
                    None => io_common::simplify_file_name(&path)?,
                };
                let grid = io_csv::read_csv_table(&path)?;
                wb.insert(&table, grid);
            }
            x => whatever!("provider not implemented {:?}", x),
        }
    }
    Ok(wb)
}

/// Runs the extraction described by a configuration file.
///
/// Arguments:
/// * `config_path` the JSON configuration
/// * `check_summary_path` a reference result. The run fails if the produced result differs.
/// * `out` where to write the result: a file path or `stdout`. Overrides the output
/// path of the configuration.
pub fn run_extraction_job(
    config_path: String,
    check_summary_path: Option<String>,
    out: Option<String>,
) -> TabResult<()> {
    let config_p = Path::new(config_path.as_str());
    let config_str = fs::read_to_string(config_path.clone()).context(OpeningJsonSnafu {
        path: config_path.clone(),
    })?;
    let settings: ExtractionSettings =
        serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    info!("settings: {:?}", settings);

    let config = validate_config(&settings)?;
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    let wb = load_sources(root_p, &settings.sources)?;

    let result = run_extraction(&wb, &config).context(ExtractionSnafu {})?;

    if !result.warnings.is_empty() {
        eprintln!("{} warning(s):", result.warnings.len());
        for w in result.warnings.iter() {
            eprintln!("  {}", w);
        }
    }

    let result_js = result_to_json(&result);
    let pretty_js = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    // A path from the configuration is relative to the configuration file.
    let out_path: Option<String> = match out {
        Some(o) => Some(o),
        None => match settings.output_settings.output_path.as_deref() {
            Some("stdout") => Some("stdout".to_string()),
            Some(p) => Some(io_common::source_path(root_p, p)),
            None => None,
        },
    };
    match out_path.as_deref() {
        Some("stdout") => println!("{}", pretty_js),
        Some(path) => {
            fs::write(path, &pretty_js).context(WritingOutputSnafu { path })?;
            info!("result written to {}", path);
        }
        None if check_summary_path.is_none() => println!("{}", pretty_js),
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_ref != pretty_js {
            warn!("Found differences with the reference string");
            print_diff(pretty_js_ref.as_str(), pretty_js.as_ref(), "\n");
            whatever!("Difference detected between the extracted result and the reference")
        }
    }

    Ok(())
}

fn run_extraction_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> TabResult<()> {
    let test_dir = option_env!("ELTAB_TEST_DIR").unwrap_or(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data"
    ));
    info!("Running test {}", test_name);
    let res = run_extraction_job(
        format!("{}/{}/{}", test_dir, test_name, config_lpath),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        Some("stdout".to_string()),
    );
    if let Err(e) = &res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(e) {
            eprintln!("trace: {}", bt);
        }
    }
    res
}

pub fn test_wrapper(test_name: &str) -> TabResult<()> {
    run_extraction_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn councillors_merged_districts() {
        init();
        assert!(test_wrapper("councillors_merged").is_ok());
    }

    #[test]
    fn representatives_blocks() {
        init();
        assert!(test_wrapper("representatives_blocks").is_ok());
    }

    #[test]
    fn missing_config() {
        init();
        assert!(matches!(
            test_wrapper("no_such_election"),
            Err(TabError::OpeningJson { .. })
        ));
    }

    #[test]
    fn json_shape() {
        let res = ElectionResult {
            year: 2024,
            election_date: "2024-10-27".to_string(),
            proportional: ProportionalSection {
                total_seats: 8,
                blocks: vec![BlockResult {
                    name: "北海道".to_string(),
                    members: vec!["北海道".to_string()],
                    total_seats: 8,
                    total_votes: 100,
                    parties: vec![PartyResult {
                        party: "X".to_string(),
                        seats: 8,
                        total_votes: 100,
                        vote_rate: 100.0,
                    }],
                }],
            },
            district: DistrictSection::default(),
            warnings: vec![],
        };
        let js = result_to_json(&res);
        assert_eq!(js["proportional"]["blocks"][0]["parties"][0]["block"], "北海道");
        assert_eq!(
            js["proportional"]["blocks"][0]["parties"][0]["candidates"],
            json!([])
        );
        assert_eq!(js["district"]["totalSeats"], 0);
        assert_eq!(js["electionDate"], "2024-10-27");
    }
}
