//! # parspace-design — Sampling Designs
//!
//! Stratified exploration of a parameter space. [`lhs::latin_hypercube`]
//! generates seeded latin-hypercube designs over the unit hypercube;
//! [`explore::sample`] decodes each design row through a schema chooser
//! into a concrete, schema-valid parameter assignment.
//!
//! Determinism is part of the contract: the same schema, sample count,
//! and seed always produce the same assignments.

pub mod explore;
pub mod lhs;

// Re-export primary entry points for ergonomic imports.
pub use explore::{sample, sample_with};
pub use lhs::latin_hypercube;
