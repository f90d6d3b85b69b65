//! # Validate Subcommand
//!
//! Checks a parameter file against either a schema document (JSON-Schema
//! conformance, reporting every violation with its instance path) or a
//! typed spec document (coercion plus domain validation, reporting the
//! first offending parameter by name).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use parspace_core::ParamValue;
use parspace_params::SpecSet;
use parspace_schema::validate::ConformanceError;
use parspace_schema::Chooser;

use crate::load_json;

/// What kind of constraint document drives the validation.
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum DocumentKind {
    /// A JSON-Schema document over the supported subset.
    #[default]
    Schema,
    /// A list of typed parameter-spec descriptors.
    Specs,
}

/// Arguments for the `parspace validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the constraint document (JSON).
    pub document: PathBuf,

    /// Path to the parameter file to validate (JSON).
    pub params: PathBuf,

    /// Whether the constraint document is a schema or a spec list.
    #[arg(long, value_enum, default_value_t = DocumentKind::Schema)]
    pub kind: DocumentKind,
}

/// Run the validate subcommand. Exit code 1 means the parameters do not
/// satisfy the constraints; errors are reserved for unreadable input.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let document = load_json(&args.document)?;
    let params = load_json(&args.params)?;

    match args.kind {
        DocumentKind::Schema => {
            let chooser = Chooser::new(&document)
                .with_context(|| format!("loading schema {}", args.document.display()))?;
            let conformance = chooser.conformance().context("compiling schema")?;
            match conformance.validate(&params) {
                Ok(()) => {
                    println!("valid");
                    Ok(0)
                }
                Err(ConformanceError::Failed { count, details }) => {
                    eprintln!("{count} violation(s):");
                    for detail in &details {
                        eprintln!("  {}: {}", detail.instance_path, detail.message);
                    }
                    Ok(1)
                }
                Err(err) => Err(err).context("validating parameters"),
            }
        }
        DocumentKind::Specs => {
            let set = SpecSet::parse_document(&document)
                .with_context(|| format!("loading specs {}", args.document.display()))?;
            match set.parse_parameters(&params) {
                Ok(parsed) => {
                    let as_value = ParamValue::Object(parsed);
                    println!("{}", as_value.to_json_lossy());
                    Ok(0)
                }
                Err(err) => {
                    eprintln!("invalid: {err}");
                    Ok(1)
                }
            }
        }
    }
}
