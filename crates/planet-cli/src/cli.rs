use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use planet_solver::{RelaxationConfig, SearchConfig, StopPolicy};

use crate::logging::LogLevel;

/// Infer 3D planet positions from measured pairwise distances.
#[derive(Debug, Parser)]
#[command(name = "planets")]
#[command(version)]
#[command(
    about = "Search for distinct 3D arrangements that fit measured distances",
    long_about = None
)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search for solutions until a stop limit is reached (or forever)
    Search(SearchArgs),

    /// Load a dataset and describe its planets
    Check {
        /// Distance dataset (JSON)
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Distance dataset (JSON)
    pub file: PathBuf,

    /// Stop after this many attempts
    #[arg(long)]
    pub max_attempts: Option<u64>,

    /// Stop after this many distinct solutions
    #[arg(long)]
    pub max_solutions: Option<usize>,

    /// Stop after this many seconds
    #[arg(long, value_parser = parse_seconds)]
    pub max_seconds: Option<Duration>,

    /// Seed for reproducible searches
    #[arg(long)]
    pub seed: Option<u64>,

    /// Abandon an attempt after this many relaxation cycles
    #[arg(long)]
    pub max_cycles: Option<usize>,

    /// Decimal places shown for coordinates
    #[arg(short, long, default_value_t = 2)]
    pub precision: usize,

    /// Hide the progress line
    #[arg(short, long)]
    pub quiet: bool,
}

/// Parse a non-negative number of seconds into a `Duration`.
fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|e| format!("`{value}` is not a number: {e}"))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| format!("`{value}` is not a usable time limit: {e}"))
}

impl SearchArgs {
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            relaxation: RelaxationConfig {
                max_cycles: self.max_cycles,
                ..RelaxationConfig::default()
            },
            stop: StopPolicy {
                max_attempts: self.max_attempts,
                max_solutions: self.max_solutions,
                max_duration: self.max_seconds,
            },
            seed: self.seed,
            ..SearchConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_flags_map_to_config() {
        let cli = Cli::parse_from([
            "planets",
            "search",
            "data.json",
            "--max-solutions",
            "3",
            "--max-seconds",
            "1.5",
            "--seed",
            "9",
        ]);
        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        let config = args.search_config();
        assert_eq!(config.stop.max_solutions, Some(3));
        assert_eq!(config.stop.max_attempts, None);
        assert_eq!(config.stop.max_duration, Some(Duration::from_millis(1500)));
        assert_eq!(config.seed, Some(9));
        assert_eq!(args.precision, 2);
    }

    #[test]
    fn test_defaults_search_forever() {
        let cli = Cli::parse_from(["planets", "search", "data.json"]);
        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        let stop = args.search_config().stop;
        assert!(stop.max_attempts.is_none() && stop.max_solutions.is_none());
        assert!(stop.max_duration.is_none());
    }

    #[test]
    fn test_bad_time_limits_are_rejected() {
        for bad in ["1e30", "-1", "NaN", "inf", "soon"] {
            let result =
                Cli::try_parse_from(["planets", "search", "data.json", "--max-seconds", bad]);
            assert!(result.is_err(), "--max-seconds {bad} was accepted");
        }
    }

    #[test]
    fn test_zero_time_limit_is_accepted() {
        let cli =
            Cli::try_parse_from(["planets", "search", "data.json", "--max-seconds", "0"]).unwrap();
        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.search_config().stop.max_duration, Some(Duration::ZERO));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
