//! # parspace-core — Foundational Types
//!
//! Shared vocabulary for the parameter-space exploration stack: the decoded
//! parameter value tree ([`ParamValue`]), the sample-vector slot type
//! ([`Sample`]), scalar datatype tags with coercion ([`DType`]), and the
//! structured error hierarchy.
//!
//! ## Design
//!
//! Decoded values are *not* `serde_json::Value`: unbounded numeric decodes
//! legitimately produce `±inf`, which JSON numbers cannot represent. The
//! [`ParamValue`] tree keeps full `f64` semantics internally and converts
//! to JSON at the output boundary.
//!
//! Errors use `thiserror` derive enums with structured fields — the
//! offending schema node, the dangling reference, the parameter name —
//! so callers can react to specific failures instead of parsing strings.

pub mod dtype;
pub mod error;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use dtype::DType;
pub use error::{ParspaceError, SchemaError, SpecError};
pub use value::{ParamValue, Sample};
