//! # parspace-params — Typed Parameter Specs
//!
//! The alternate, typed representation of a parameter space, used when no
//! JSON-Schema document is available: a flat, ordered set of named,
//! typed constraint objects — Interval, Choice, Str, List, Fixed, and
//! Point2D — each owning its own coercion, domain validation, and
//! scalar-to-value decoding.
//!
//! ## Design
//!
//! Spec kinds form one tagged [`ParamSpec`] enum with a capability
//! surface ({coerce, is_valid, validate, num_samples, choose}) instead
//! of an inheritance chain; every `match` over the kinds is exhaustive.
//! The decode half reuses the schema engine's primitive decoders
//! (`parspace-schema::primitives`), which is what keeps schema-driven
//! and spec-driven sampling in agreement for analogous shapes.
//!
//! Construction is fail-fast: a descriptor with `min > max`, an empty
//! choice list, or an unknown kind/dtype is rejected with
//! [`SpecError::MalformedSpec`](parspace_core::SpecError::MalformedSpec)
//! before any decode or validation is attempted.

pub mod set;
pub mod spec;

// Re-export primary types for ergonomic imports.
pub use set::SpecSet;
pub use spec::{
    ChoiceSpec, FixedSpec, IntervalSpec, ListSpec, ParamSpec, Point2DSpec, StringSpec,
};
