//! tfbreak CLI
//!
//! Command-line interface for breaking-change detection between two versions
//! of a Terraform module.
//!
//! Exit codes: 0 when the check passes, 1 when it fails, 2 on any error.

use clap::{Parser, Subcommand};
use tfbreak_core::logging_facility::{init, Profile};
use tfbreak_core::{ExError, TfbreakError};

mod commands;
mod render;

/// Process exit code for a check that passed (and for non-check commands)
const EXIT_PASS: i32 = 0;
/// Process exit code for a check that failed
const EXIT_FAIL: i32 = 1;
/// Process exit code for configuration, input and I/O errors
const EXIT_ERROR: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "tfbreak")]
#[command(about = "tfbreak - Breaking-change detection for Terraform modules", long_about = None)]
struct Cli {
    /// Human-readable debug logs on stderr instead of JSON info logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two module snapshots and report breaking changes
    Check(commands::check::CheckArgs),
    /// List the rule catalog
    Rules(commands::rules::RulesArgs),
    /// Show the documentation of one rule
    Explain(commands::explain::ExplainArgs),
}

fn run(command: Commands) -> Result<i32, TfbreakError> {
    match command {
        Commands::Check(args) => commands::check::execute(args).map(|passed| {
            if passed {
                EXIT_PASS
            } else {
                EXIT_FAIL
            }
        }),
        Commands::Rules(args) => commands::rules::execute(args).map(|()| EXIT_PASS),
        Commands::Explain(args) => commands::explain::execute(args).map(|()| EXIT_PASS),
    }
}

fn main() {
    let cli = Cli::parse();
    init(if cli.verbose {
        Profile::Development
    } else {
        Profile::Production
    });

    match run(cli.command) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let ex_err: ExError = err.clone().into();
            eprintln!("Error: {} [{}]", err, ex_err.code());
            std::process::exit(EXIT_ERROR);
        }
    }
}
