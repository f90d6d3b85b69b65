//! # parspace-cli — CLI Tool for the parspace Stack
//!
//! Provides the `parspace` command-line interface over the schema engine,
//! typed spec sets, and sampling designs.
//!
//! ## Subcommands
//!
//! - `parspace cardinality` — Report how many `[0,1)` scalars a schema
//!   consumes per decode.
//! - `parspace sample` — Draw seeded latin-hypercube samples from a
//!   schema's parameter space, one JSON assignment per line.
//! - `parspace validate` — Validate a parameter file against a schema
//!   document or a typed spec document.

pub mod cardinality;
pub mod sample;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Load and parse a JSON document from disk.
pub fn load_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
