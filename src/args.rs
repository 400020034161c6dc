use clap::Parser;

/// Extracts the official results of an election from its published tables.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON configuration describing the election and the layout of its tables.
    /// The source files are looked up relative to this file. The format is documented in the
    /// `manual` module of the election_tables crate.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference file containing the result of the extraction in JSON format. If provided,
    /// eltab checks that the extracted result matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the result will be written in JSON format to the given
    /// location. Setting this option overrides the output path that may be specified in the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
