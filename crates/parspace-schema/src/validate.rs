//! # Schema Conformance Validation
//!
//! Validates concrete parameter sets against the schema document via the
//! `jsonschema` crate. The compiled validator is built once per schema
//! and reused across checks; validation errors carry the JSON Pointer to
//! each violating field and a human-readable message.
//!
//! This is the check half of the round-trip property: any value produced
//! by [`Chooser::choose`](crate::chooser::Chooser::choose) against a
//! schema must pass conformance validation against the same schema.

use serde_json::Value;
use thiserror::Error;

/// One conformance violation with diagnostic context.
#[derive(Debug, Clone)]
pub struct ConformanceDetail {
    /// JSON Pointer to the violating field in the parameter set.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl std::fmt::Display for ConformanceDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "path={}: {}", self.instance_path, self.message)
    }
}

/// Errors returned by conformance validation.
#[derive(Error, Debug)]
pub enum ConformanceError {
    /// The schema document itself is not a valid JSON Schema.
    #[error("failed to compile schema: {reason}")]
    Compile {
        /// Human-readable reason from the schema compiler.
        reason: String,
    },

    /// The parameter set violated the schema.
    #[error("{count} conformance violation(s)")]
    Failed {
        /// Number of violations found.
        count: usize,
        /// Individual violation details.
        details: Vec<ConformanceDetail>,
    },
}

/// A compiled conformance validator for one schema document.
pub struct Conformance {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for Conformance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conformance").finish_non_exhaustive()
    }
}

impl Conformance {
    /// Compile a schema document into a reusable validator.
    pub fn new(schema: &Value) -> Result<Self, ConformanceError> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| ConformanceError::Compile {
                reason: e.to_string(),
            })?;
        Ok(Self { validator })
    }

    /// Check a parameter set, collecting every violation.
    pub fn validate(&self, parameters: &Value) -> Result<(), ConformanceError> {
        let details: Vec<ConformanceDetail> = self
            .validator
            .iter_errors(parameters)
            .map(|err| ConformanceDetail {
                instance_path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();

        if details.is_empty() {
            Ok(())
        } else {
            tracing::debug!(violations = details.len(), "parameter set failed conformance");
            Err(ConformanceError::Failed {
                count: details.len(),
                details,
            })
        }
    }

    /// Fast boolean check without violation collection.
    pub fn is_valid(&self, parameters: &Value) -> bool {
        self.validator.is_valid(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "x": { "type": "number", "minimum": 0, "maximum": 1 },
                "tag": { "enum": ["a", "b"] }
            },
            "required": ["x"]
        })
    }

    #[test]
    fn conforming_set_passes() {
        let conformance = Conformance::new(&schema()).unwrap();
        assert!(conformance.validate(&json!({ "x": 0.5, "tag": "a" })).is_ok());
        assert!(conformance.is_valid(&json!({ "x": 0.0 })));
    }

    #[test]
    fn violations_carry_instance_paths() {
        let conformance = Conformance::new(&schema()).unwrap();
        let err = conformance
            .validate(&json!({ "x": 2.0, "tag": "c" }))
            .unwrap_err();
        match err {
            ConformanceError::Failed { count, details } => {
                assert_eq!(count, 2);
                assert!(details.iter().any(|d| d.instance_path == "/x"));
                assert!(details.iter().any(|d| d.instance_path == "/tag"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_field_fails() {
        let conformance = Conformance::new(&schema()).unwrap();
        let err = conformance.validate(&json!({ "tag": "a" })).unwrap_err();
        assert!(matches!(err, ConformanceError::Failed { count: 1, .. }));
    }

    #[test]
    fn invalid_schema_fails_to_compile() {
        let err = Conformance::new(&json!({ "type": 42 })).unwrap_err();
        assert!(matches!(err, ConformanceError::Compile { .. }));
    }
}
