//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the parspace stack. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Schema dispatch and resolution errors identify the offending node or
//!   reference, not just a message.
//! - Parameter validation errors name the parameter and carry expected vs
//!   actual information.
//! - Construction-time errors (malformed specs, dangling references,
//!   reference cycles) fail fast, before any decode is attempted — a
//!   spec or schema object is reused across many decodes.
//! - No error is retried inside the core; re-drawing a sample is the
//!   caller's policy.

use thiserror::Error;

use crate::dtype::DType;

/// Top-level error type for the parspace stack.
#[derive(Error, Debug)]
pub enum ParspaceError {
    /// Schema dispatch, resolution, or decode failure.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Typed parameter-spec construction or validation failure.
    #[error("parameter spec error: {0}")]
    Spec(#[from] SpecError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error in schema dispatch, reference resolution, or scalar decoding.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No structural keyword matched and the `type` value is not handled.
    #[error("schema node cannot be dispatched (no known keyword or type): {node}")]
    UnrecognizedSchema {
        /// Compact rendering of the offending schema node.
        node: String,
    },

    /// A `$ref` did not resolve against the root document.
    #[error("unresolved schema reference: {reference}")]
    UnresolvedReference {
        /// The reference URI that failed to resolve.
        reference: String,
    },

    /// The `$ref` graph contains a cycle; cardinality would be unbounded.
    #[error("schema reference cycle through {reference}")]
    ReferenceCycle {
        /// A reference participating in the cycle.
        reference: String,
    },

    /// The sample vector does not match the schema's cardinality exactly.
    #[error("sample vector length {actual} does not match schema cardinality {expected}")]
    SampleLength {
        /// Required length, as computed by the cardinality counter.
        expected: usize,
        /// Length of the vector that was supplied.
        actual: usize,
    },

    /// A sample slot held text where a scalar was required (only the
    /// string decoder accepts pre-chosen text slots).
    #[error("sample slot {index} holds text but a [0,1) scalar is required")]
    NonScalarSample {
        /// Offset of the offending slot in the sample vector.
        index: usize,
    },

    /// The schema node is structurally invalid for its keyword.
    #[error("malformed schema at {context}: {reason}")]
    Malformed {
        /// Where in the document the problem was found.
        context: String,
        /// Human-readable description of the violation.
        reason: String,
    },
}

/// Error in typed parameter-spec construction or flat-map validation.
#[derive(Error, Debug)]
pub enum SpecError {
    /// A declared parameter was absent from the supplied set.
    #[error("missing parameter: {name}")]
    MissingParameter {
        /// The declared name that was not supplied.
        name: String,
    },

    /// A supplied parameter name is not declared by any spec.
    #[error("unknown parameter: {name}")]
    UnknownParameter {
        /// The supplied name with no matching spec.
        name: String,
    },

    /// A value could not be coerced to the spec's declared datatype.
    #[error("cannot coerce {value} to {expected}")]
    TypeCoercion {
        /// The datatype the spec declares.
        expected: DType,
        /// Compact rendering of the value that failed to coerce.
        value: String,
    },

    /// A coerced value fell outside the spec's domain.
    #[error("invalid value for {name}: {reason}")]
    InvalidValue {
        /// The parameter the value was supplied for.
        name: String,
        /// Which domain rule was violated.
        reason: String,
    },

    /// A spec descriptor violated a construction-time invariant
    /// (min > max, empty choice set, unknown kind or dtype, ...).
    #[error("malformed parameter spec {name}: {reason}")]
    MalformedSpec {
        /// The spec being constructed.
        name: String,
        /// Which invariant was violated.
        reason: String,
    },
}
