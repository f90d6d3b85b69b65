//! Ordered collections of parameter specs.
//!
//! A [`SpecSet`] is the unit a simulation exposes: its declared
//! parameters, in declaration order. The order is load-bearing for
//! decoding — spec `i` consumes its sample slots before spec `i + 1`.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use parspace_core::{ParamValue, Sample, SpecError};

use crate::spec::ParamSpec;

/// An ordered, name-unique set of parameter specs.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSet {
    specs: Vec<ParamSpec>,
}

impl SpecSet {
    /// Build a set from specs, rejecting duplicate names.
    pub fn new(specs: Vec<ParamSpec>) -> Result<Self, SpecError> {
        let mut seen = std::collections::BTreeSet::new();
        for spec in &specs {
            if !seen.insert(spec.name().to_string()) {
                return Err(SpecError::MalformedSpec {
                    name: spec.name().to_string(),
                    reason: "parameter name declared more than once".to_string(),
                });
            }
        }
        Ok(Self { specs })
    }

    /// Parse a JSON array of descriptors into a set.
    pub fn parse_document(document: &Value) -> Result<Self, SpecError> {
        let descriptors = document.as_array().ok_or_else(|| SpecError::MalformedSpec {
            name: String::new(),
            reason: format!("a spec document must be a list, got {document}"),
        })?;
        let specs = descriptors
            .iter()
            .map(ParamSpec::parse)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = specs.len(), "parsed parameter spec document");
        Self::new(specs)
    }

    /// The specs in declaration order.
    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    /// Look up a spec by name.
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.iter().find(|s| s.name() == name)
    }

    /// Total sample slots one decode of the whole set consumes.
    pub fn num_samples(&self) -> usize {
        self.specs.iter().map(ParamSpec::num_samples).sum()
    }

    /// Decode an exact-length sample vector into a named assignment,
    /// consuming slots in declaration order.
    pub fn choose(&self, samples: &[Sample]) -> Result<BTreeMap<String, ParamValue>, SpecError> {
        let expected = self.num_samples();
        if samples.len() != expected {
            return Err(SpecError::InvalidValue {
                name: "samples".to_string(),
                reason: format!(
                    "expected exactly {expected} sample slots, got {}",
                    samples.len()
                ),
            });
        }

        let mut assignment = BTreeMap::new();
        let mut cursor = 0;
        for spec in &self.specs {
            let (value, next) = spec.choose(samples, cursor)?;
            assignment.insert(spec.name().to_string(), value);
            cursor = next;
        }
        Ok(assignment)
    }

    /// Validate a user-supplied parameter document against the set.
    ///
    /// Unknown names are rejected first, then missing parameters without
    /// a default; what remains is coerced and domain-checked per spec.
    /// Absent parameters with a default take that default.
    pub fn parse_parameters(
        &self,
        document: &Value,
    ) -> Result<BTreeMap<String, ParamValue>, SpecError> {
        let supplied = document.as_object().ok_or_else(|| SpecError::MalformedSpec {
            name: String::new(),
            reason: format!("a parameter document must be a mapping, got {document}"),
        })?;

        for name in supplied.keys() {
            if self.get(name).is_none() {
                return Err(SpecError::UnknownParameter { name: name.clone() });
            }
        }

        let mut parsed = BTreeMap::new();
        for spec in &self.specs {
            let value = match supplied.get(spec.name()) {
                Some(raw) => spec.validate(&ParamValue::from_json(raw))?,
                None => spec.default().ok_or_else(|| SpecError::MissingParameter {
                    name: spec.name().to_string(),
                })?,
            };
            parsed.insert(spec.name().to_string(), value);
        }
        Ok(parsed)
    }
}
