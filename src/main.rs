mod args;
mod extract;

use clap::Parser;
use log::LevelFilter;

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    let res = extract::run_extraction_job(args.config, args.reference, args.out);
    if let Err(e) = res {
        eprintln!("Error: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(s) = source {
            eprintln!("  caused by: {}", s);
            source = s.source();
        }
        std::process::exit(1);
    }
}
