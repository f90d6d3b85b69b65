//! # parspace CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros for argument parsing.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parspace_cli::cardinality::{run_cardinality, CardinalityArgs};
use parspace_cli::sample::{run_sample, SampleArgs};
use parspace_cli::validate::{run_validate, ValidateArgs};

/// parspace — parameter-space exploration toolkit.
///
/// Counts, samples, and validates simulation parameter spaces described
/// by declarative schema documents or typed spec lists.
#[derive(Parser, Debug)]
#[command(name = "parspace", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report how many sample slots one decode of a schema consumes.
    Cardinality(CardinalityArgs),

    /// Draw latin-hypercube samples from a schema's parameter space.
    Sample(SampleArgs),

    /// Validate a parameter file against a schema or spec document.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Cardinality(args) => run_cardinality(&args),
        Commands::Sample(args) => run_sample(&args),
        Commands::Validate(args) => run_validate(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
