//! # parspace-schema — Parameter Schema Engine
//!
//! The recursive schema-walking core of the parspace stack. Given a
//! declarative schema over a JSON-Schema subset (`properties`, `items`,
//! `minItems`/`maxItems`, `enum`, `$ref`, `allOf`, `type` with
//! `minimum`/`maximum` and `minLength`/`maxLength`), this crate:
//!
//! - **counts** how many independent `[0,1)` scalars a schema requires
//!   ([`Chooser::cardinality`]);
//! - **decodes** a flat sample vector of exactly that length into a
//!   concrete, schema-shaped value ([`Chooser::choose`]) — the mapping a
//!   latin-hypercube row travels to become a simulation parameter set;
//! - **validates** concrete parameter sets against the schema via the
//!   `jsonschema` crate ([`Conformance`]).
//!
//! ## Design
//!
//! Raw documents are parsed once, at load time, into the tagged
//! [`SchemaNode`] grammar; keyword-priority ambiguity is resolved there
//! and never probed again during decoding. References resolve through an
//! immutable, cycle-checked [`Resolver`] built alongside the root node.
//! Custom parameter kinds plug in through the constructor-injected
//! [`HandlerRegistry`] — there is no global handler state.
//!
//! Decoding is purely computational: no I/O, no shared mutable state.
//! One chooser may serve many concurrent decodes, each with its own
//! sample vector and cursor.

pub mod chooser;
pub mod node;
pub mod primitives;
pub mod registry;
pub mod resolver;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use chooser::Chooser;
pub use node::{HandlerKey, SchemaNode, PRIMITIVE_TYPES, STRUCTURAL_KEYWORDS};
pub use primitives::{enum_index, hex_string, remap_unit, DEFAULT_STRING_LENGTH, HEX_ALPHABET};
pub use registry::{HandlerRegistry, ShapeHandler};
pub use resolver::Resolver;
pub use validate::{Conformance, ConformanceDetail, ConformanceError};
