//! `planets` command-line entry point.
//!
//! Usage:
//!     planets search distances.json --max-solutions 5
//!     planets check distances.json

mod cli;
mod logging;
mod report;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use planet_data::load_dataset_file;
use planet_solver::SearchLoop;
use tracing::error;

use crate::cli::{Cli, Commands, SearchArgs};
use crate::report::{summary_text, ConsoleReporter, DatasetReport, ProgressLine};

fn cmd_search(args: &SearchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let set = load_dataset_file(&args.file)?;
    let search = SearchLoop::new(set.clone(), args.search_config())?;

    let mut progress = ProgressLine::new(!args.quiet);
    let mut reporter = ConsoleReporter::new(io::stdout().lock(), &set, args.precision);
    let summary = search.run(&mut progress, &mut reporter)?;
    drop(reporter);
    if !args.quiet {
        eprintln!();
    }
    print!("{}", summary_text(&summary));
    Ok(())
}

fn cmd_check(file: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let set = load_dataset_file(file)?;
    print!("{}", DatasetReport { set: &set });
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level);

    let result = match &cli.command {
        Commands::Search(args) => cmd_search(args),
        Commands::Check { file } => cmd_check(file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "planets failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
