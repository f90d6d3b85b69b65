//! # Cardinality Subcommand
//!
//! Reports how many independent `[0,1)` scalars one decode of a schema
//! consumes, which is the row width every sampling design must match.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use parspace_schema::Chooser;

use crate::load_json;

/// Arguments for the `parspace cardinality` subcommand.
#[derive(Args, Debug)]
pub struct CardinalityArgs {
    /// Path to the schema document (JSON).
    pub schema: PathBuf,
}

/// Run the cardinality subcommand.
pub fn run_cardinality(args: &CardinalityArgs) -> Result<u8> {
    let document = load_json(&args.schema)?;
    let chooser = Chooser::new(&document)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    let cardinality = chooser.cardinality().context("counting sample slots")?;
    println!("{cardinality}");
    Ok(0)
}
