//! # Sample Subcommand
//!
//! Draws latin-hypercube samples from the parameter space a schema
//! describes and prints one JSON assignment per line. Decoded values
//! from half-bounded or unbounded intervals can be non-finite, so
//! output goes through the lossy JSON rendering ("inf", "-inf").

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use parspace_design::sample_with;
use parspace_schema::Chooser;

use crate::load_json;

/// Arguments for the `parspace sample` subcommand.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Path to the schema document (JSON).
    pub schema: PathBuf,

    /// Number of parameter assignments to draw.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub samples: usize,

    /// RNG seed; the same seed always reproduces the same draw.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Run the sample subcommand.
pub fn run_sample(args: &SampleArgs) -> Result<u8> {
    let document = load_json(&args.schema)?;
    let chooser = Chooser::new(&document)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;

    let assignments =
        sample_with(&chooser, args.samples, args.seed).context("drawing samples")?;
    for assignment in &assignments {
        println!("{}", assignment.to_json_lossy());
    }
    Ok(0)
}
