//! Command-line front end for the `ctest` binary.
//!
//! Runs the harness's self-test suite against a stdout session and exits
//! with the number of failed tests.

use std::{path::PathBuf, process};

use clap::Parser;
use miette::Report;
use tracing_subscriber::EnvFilter;

use crate::{selftest, HarnessError, Session, SessionConfig, Summary};

// ============================================================================
// CLI ARGUMENTS
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "ctest",
    version,
    about = "Tree-reporting unit-test harness: runs the harness self-test suite."
)]
pub struct CtestArgs {
    /// Suppress the test tree; only the summary line is printed.
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the final summary as JSON after the summary line.
    #[arg(long)]
    pub json: bool,

    /// Only run top-level groups whose name contains this text.
    #[arg(long, value_name = "SUBSTR")]
    pub filter: Option<String>,

    /// Session configuration file (JSON).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// Exit status used when the run cannot start.
pub const SETUP_FAILURE: i32 = 255;

/// The main entry point for the CLI.
pub fn run() {
    init_tracing();
    let args = CtestArgs::parse();

    match execute(&args) {
        Ok(summary) => process::exit(summary.exit_code()),
        Err(error) => {
            print_error(error);
            process::exit(SETUP_FAILURE);
        }
    }
}

/// Runs the suite as described by `args` and prints the summary.
pub fn execute(args: &CtestArgs) -> Result<Summary, HarnessError> {
    let config = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };

    let mut session = Session::new(config);
    let filter = args.filter.as_deref();
    session.run_top(|s| selftest::run_suite(s, filter), !args.quiet);

    let summary = session.finish();
    if args.json {
        match serde_json::to_string(&summary) {
            Ok(json) => println!("{json}"),
            Err(error) => tracing::warn!(%error, "summary serialization failed"),
        }
    }
    Ok(summary)
}

pub fn print_error(error: HarnessError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

/// Logs go to stderr so stdout carries only the report. `RUST_LOG`
/// overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
