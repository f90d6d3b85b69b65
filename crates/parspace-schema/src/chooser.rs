//! # Cardinality Counter & Value Chooser
//!
//! The heart of the exploration engine. A [`Chooser`] owns one parsed
//! schema, its reference resolver, and its handler registry; it answers
//! two questions about that schema:
//!
//! 1. **Cardinality** — how many independent `[0,1)` scalars does one
//!    concrete value of this shape require?
//! 2. **Choose** — given exactly that many scalars, which concrete,
//!    schema-shaped value do they denote?
//!
//! Both walk the same tagged grammar, so any shape the counter accepts
//! the chooser accepts identically, consuming exactly the counted number
//! of scalars. Consumption order is a strict invariant: object properties
//! in lexicographic name order, conjunction branches and array elements
//! in declaration order. Repeated decodes of the same (schema, sample
//! vector) pair therefore always produce identical values.
//!
//! The chooser is immutable after construction and safe to share across
//! concurrent decodes; each decode threads its own cursor.

use std::collections::BTreeMap;

use serde_json::Value;

use parspace_core::{ParamValue, Sample, SchemaError};

use crate::node::SchemaNode;
use crate::primitives::{enum_index, hex_string, remap_unit, DEFAULT_STRING_LENGTH};
use crate::registry::HandlerRegistry;
use crate::resolver::Resolver;
use crate::validate::{Conformance, ConformanceError};

/// Deterministic sample-vector decoder for one schema.
#[derive(Debug, Clone)]
pub struct Chooser {
    document: Value,
    root: SchemaNode,
    resolver: Resolver,
    registry: HandlerRegistry,
}

impl Chooser {
    /// Parse a schema document with built-in shapes only.
    ///
    /// References are resolved and cycle-checked here; a schema that
    /// cannot be decoded fails at construction, before any sampling.
    pub fn new(document: &Value) -> Result<Self, SchemaError> {
        Self::with_registry(document, HandlerRegistry::new())
    }

    /// Parse a schema document with custom shape handlers.
    pub fn with_registry(document: &Value, registry: HandlerRegistry) -> Result<Self, SchemaError> {
        let root = SchemaNode::parse(document, &registry, "#")?;
        let resolver = Resolver::build(document, &root, &registry)?;
        tracing::debug!(shape = root.shape(), "schema parsed");
        Ok(Self {
            document: document.clone(),
            root,
            resolver,
            registry,
        })
    }

    /// The parsed root node.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// The raw schema document the chooser was built from.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The reference resolver built alongside the root node.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    // -----------------------------------------------------------------------
    // Cardinality counter
    // -----------------------------------------------------------------------

    /// Required sample-vector length for the whole schema.
    ///
    /// A pure function of the schema: no sample vector is involved.
    pub fn cardinality(&self) -> Result<usize, SchemaError> {
        self.node_cardinality(&self.root)
    }

    /// Required sample count for one node of the schema.
    pub fn node_cardinality(&self, node: &SchemaNode) -> Result<usize, SchemaError> {
        match node {
            SchemaNode::Object { properties } => {
                let mut total = 0;
                for child in properties.values() {
                    total += self.node_cardinality(child)?;
                }
                Ok(total)
            }
            // Sampling always materializes exactly the minimum length.
            SchemaNode::Array {
                items, min_items, ..
            } => Ok(self.node_cardinality(items)? * min_items),
            SchemaNode::Ref { reference } => {
                let target = self.resolver.resolve(reference)?;
                self.node_cardinality(target)
            }
            SchemaNode::AllOf { branches } => {
                let mut total = 0;
                for branch in branches {
                    total += self.node_cardinality(branch)?;
                }
                Ok(total)
            }
            SchemaNode::Enum { .. }
            | SchemaNode::Number { .. }
            | SchemaNode::Integer { .. }
            | SchemaNode::String { .. } => Ok(1),
            SchemaNode::Custom { key, raw } => {
                let handler = self.registry.handler_for(key)?;
                handler.cardinality(self, raw)
            }
        }
    }

    /// Required sample count for a raw subschema.
    ///
    /// Entry point for custom handlers recursing into shapes the engine
    /// understands.
    pub fn cardinality_raw(&self, raw: &Value) -> Result<usize, SchemaError> {
        let node = SchemaNode::parse(raw, &self.registry, "#")?;
        self.node_cardinality(&node)
    }

    // -----------------------------------------------------------------------
    // Value chooser
    // -----------------------------------------------------------------------

    /// Decode a full sample vector into one schema-shaped value.
    ///
    /// The vector length must equal [`Chooser::cardinality`] exactly;
    /// both shortfall and excess fail with [`SchemaError::SampleLength`],
    /// so a decode can never silently waste or starve samples.
    pub fn choose(&self, samples: &[Sample]) -> Result<ParamValue, SchemaError> {
        let expected = self.cardinality()?;
        if samples.len() != expected {
            return Err(SchemaError::SampleLength {
                expected,
                actual: samples.len(),
            });
        }
        let (value, consumed) = self.choose_at(&self.root, samples, 0)?;
        debug_assert_eq!(consumed, expected, "counter and chooser disagree");
        tracing::debug!(consumed, shape = self.root.shape(), "sample vector decoded");
        Ok(value)
    }

    /// Decode one node starting at cursor `at`.
    ///
    /// Returns the decoded value and the next unused cursor position.
    /// Public so custom handlers can recurse into parsed shapes.
    pub fn choose_at(
        &self,
        node: &SchemaNode,
        samples: &[Sample],
        at: usize,
    ) -> Result<(ParamValue, usize), SchemaError> {
        match node {
            SchemaNode::Object { properties } => {
                // BTreeMap iteration is lexicographic by name, which fixes
                // the per-property scalar assignment across decodes.
                let mut decoded = BTreeMap::new();
                let mut cursor = at;
                for (name, child) in properties {
                    let (value, next) = self.choose_at(child, samples, cursor)?;
                    decoded.insert(name.clone(), value);
                    cursor = next;
                }
                Ok((ParamValue::Object(decoded), cursor))
            }
            SchemaNode::Array {
                items, min_items, ..
            } => {
                let mut decoded = Vec::with_capacity(*min_items);
                let mut cursor = at;
                for _ in 0..*min_items {
                    let (value, next) = self.choose_at(items, samples, cursor)?;
                    decoded.push(value);
                    cursor = next;
                }
                Ok((ParamValue::List(decoded), cursor))
            }
            SchemaNode::Enum { values } => {
                let x = scalar_at(samples, at)?;
                let value = values[enum_index(x, values.len())].clone();
                Ok((value, at + 1))
            }
            SchemaNode::Ref { reference } => {
                let target = self.resolver.resolve(reference)?;
                self.choose_at(target, samples, at)
            }
            SchemaNode::AllOf { branches } => {
                // Branches decode in listed order against the same cursor;
                // mapping results merge with last-branch-wins overwrite.
                let mut merged = BTreeMap::new();
                let mut cursor = at;
                for branch in branches {
                    let (value, next) = self.choose_at(branch, samples, cursor)?;
                    cursor = next;
                    match value {
                        ParamValue::Object(map) => merged.extend(map),
                        other => {
                            return Err(SchemaError::Malformed {
                                context: "allOf".to_string(),
                                reason: format!(
                                    "conjunction merges mappings but a branch decoded to {}",
                                    other.kind()
                                ),
                            })
                        }
                    }
                }
                Ok((ParamValue::Object(merged), cursor))
            }
            SchemaNode::Number { minimum, maximum } => {
                let x = scalar_at(samples, at)?;
                Ok((ParamValue::Number(remap_unit(x, *minimum, *maximum)), at + 1))
            }
            SchemaNode::Integer { minimum, maximum } => {
                let x = scalar_at(samples, at)?;
                // Truncation toward zero; ±inf saturates to i64::MIN/MAX.
                let value = remap_unit(x, *minimum, *maximum).trunc() as i64;
                Ok((ParamValue::Integer(value), at + 1))
            }
            SchemaNode::String {
                min_length,
                max_length,
            } => match sample_at(samples, at)? {
                // A pre-chosen text slot passes through unchanged.
                Sample::Text(s) => Ok((ParamValue::Text(s.clone()), at + 1)),
                Sample::Scalar(x) => {
                    let length = min_length
                        .unwrap_or(DEFAULT_STRING_LENGTH)
                        .min(max_length.unwrap_or(usize::MAX));
                    Ok((ParamValue::Text(hex_string(*x, length)), at + 1))
                }
            },
            SchemaNode::Custom { key, raw } => {
                let handler = self.registry.handler_for(key)?;
                handler.choose(self, raw, samples, at)
            }
        }
    }

    /// Decode a raw subschema starting at cursor `at`.
    ///
    /// Entry point for custom handlers recursing into shapes the engine
    /// understands.
    pub fn choose_raw(
        &self,
        raw: &Value,
        samples: &[Sample],
        at: usize,
    ) -> Result<(ParamValue, usize), SchemaError> {
        let node = SchemaNode::parse(raw, &self.registry, "#")?;
        self.choose_at(&node, samples, at)
    }

    // -----------------------------------------------------------------------
    // Conformance validation
    // -----------------------------------------------------------------------

    /// Compile this chooser's document into a JSON Schema conformance
    /// validator for checking concrete parameter sets.
    pub fn conformance(&self) -> Result<Conformance, ConformanceError> {
        Conformance::new(&self.document)
    }
}

fn sample_at(samples: &[Sample], at: usize) -> Result<&Sample, SchemaError> {
    samples.get(at).ok_or(SchemaError::SampleLength {
        expected: at + 1,
        actual: samples.len(),
    })
}

fn scalar_at(samples: &[Sample], at: usize) -> Result<f64, SchemaError> {
    sample_at(samples, at)?
        .scalar()
        .ok_or(SchemaError::NonScalarSample { index: at })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    use crate::registry::ShapeHandler;

    fn chooser(document: Value) -> Chooser {
        Chooser::new(&document).expect("schema should parse")
    }

    #[test]
    fn object_cardinality_sums_properties() {
        let c = chooser(json!({
            "properties": {
                "a": { "type": "number" },
                "b": { "type": "string" },
                "c": { "enum": [1, 2, 3] }
            }
        }));
        assert_eq!(c.cardinality().unwrap(), 3);
    }

    #[test]
    fn array_cardinality_uses_minimum_items() {
        let c = chooser(json!({
            "items": { "type": "number" },
            "minItems": 3,
            "maxItems": 10
        }));
        assert_eq!(c.cardinality().unwrap(), 3);

        // No minItems: nothing is materialized.
        let c = chooser(json!({ "items": { "type": "number" } }));
        assert_eq!(c.cardinality().unwrap(), 0);
        assert_eq!(c.choose(&[]).unwrap(), ParamValue::List(vec![]));
    }

    #[test]
    fn all_of_cardinality_sums_branches() {
        let c = chooser(json!({
            "allOf": [
                { "properties": { "a": { "type": "number" } } },
                { "properties": { "b": { "type": "number" }, "c": { "type": "number" } } }
            ]
        }));
        assert_eq!(c.cardinality().unwrap(), 3);
    }

    #[test]
    fn object_decode_is_name_ordered() {
        // "a" is declared after "z" but must consume the first scalar.
        let c = chooser(json!({
            "properties": {
                "z": { "type": "number", "minimum": 0, "maximum": 1 },
                "a": { "type": "number", "minimum": 0, "maximum": 100 }
            }
        }));
        let decoded = c.choose(&Sample::scalars([0.5, 0.25])).unwrap();
        let map = decoded.as_object().unwrap();
        assert_eq!(map["a"], ParamValue::Number(50.0));
        assert_eq!(map["z"], ParamValue::Number(0.25));
    }

    #[test]
    fn enum_boundaries_select_first_and_last() {
        let c = chooser(json!({ "enum": ["red", "green", "blue"] }));
        assert_eq!(
            c.choose(&Sample::scalars([0.0])).unwrap(),
            ParamValue::Text("red".to_string())
        );
        assert_eq!(
            c.choose(&Sample::scalars([0.999_999])).unwrap(),
            ParamValue::Text("blue".to_string())
        );
    }

    #[test]
    fn reference_decode_consumes_target_shape() {
        let c = chooser(json!({
            "definitions": {
                "unit": { "type": "number", "minimum": 0, "maximum": 1 }
            },
            "properties": {
                "x": { "$ref": "#/definitions/unit" },
                "y": { "$ref": "#/definitions/unit" }
            }
        }));
        assert_eq!(c.cardinality().unwrap(), 2);
        let decoded = c.choose(&Sample::scalars([0.25, 0.75])).unwrap();
        let map = decoded.as_object().unwrap();
        assert_eq!(map["x"], ParamValue::Number(0.25));
        assert_eq!(map["y"], ParamValue::Number(0.75));
    }

    #[test]
    fn all_of_merge_is_last_branch_wins() {
        let c = chooser(json!({
            "allOf": [
                { "properties": { "a": { "type": "number", "minimum": 0, "maximum": 1 } } },
                { "properties": { "a": { "type": "number", "minimum": 10, "maximum": 11 } } }
            ]
        }));
        assert_eq!(c.cardinality().unwrap(), 2);
        let decoded = c.choose(&Sample::scalars([0.5, 0.5])).unwrap();
        // Both branches consumed a scalar; the second branch's value won.
        assert_eq!(decoded.as_object().unwrap()["a"], ParamValue::Number(10.5));
    }

    #[test]
    fn all_of_non_mapping_branch_is_malformed() {
        let c = chooser(json!({
            "allOf": [ { "type": "number" } ]
        }));
        let err = c.choose(&Sample::scalars([0.5])).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
    }

    #[test]
    fn integer_decode_truncates_toward_zero() {
        let c = chooser(json!({ "type": "integer", "minimum": 0, "maximum": 10 }));
        assert_eq!(
            c.choose(&Sample::scalars([0.29])).unwrap(),
            ParamValue::Integer(2)
        );

        let c = chooser(json!({ "type": "integer", "minimum": -10, "maximum": 0 }));
        assert_eq!(
            c.choose(&Sample::scalars([0.71])).unwrap(),
            ParamValue::Integer(-2)
        );
    }

    #[test]
    fn unbounded_number_zero_scalar_is_negative_infinity() {
        let c = chooser(json!({ "type": "number" }));
        assert_eq!(
            c.choose(&Sample::scalars([0.0])).unwrap(),
            ParamValue::Number(f64::NEG_INFINITY)
        );
        assert_eq!(
            c.choose(&Sample::scalars([0.5])).unwrap(),
            ParamValue::Number(0.0)
        );
    }

    #[test]
    fn string_decode_defaults_to_length_ten() {
        let c = chooser(json!({ "type": "string" }));
        for &x in &[0.0, 0.37, 0.999] {
            let decoded = c.choose(&Sample::scalars([x])).unwrap();
            assert_eq!(decoded.as_str().unwrap().len(), 10);
        }
    }

    #[test]
    fn string_decode_respects_length_bounds() {
        let c = chooser(json!({ "type": "string", "minLength": 4 }));
        let decoded = c.choose(&Sample::scalars([0.5])).unwrap();
        assert_eq!(decoded.as_str().unwrap().len(), 4);

        // maxLength caps the default of 10.
        let c = chooser(json!({ "type": "string", "maxLength": 6 }));
        let decoded = c.choose(&Sample::scalars([0.5])).unwrap();
        assert_eq!(decoded.as_str().unwrap().len(), 6);
    }

    #[test]
    fn string_text_slot_passes_through() {
        let c = chooser(json!({
            "properties": {
                "name": { "type": "string" },
                "size": { "type": "number", "minimum": 0, "maximum": 1 }
            }
        }));
        let samples = vec![Sample::from("pinned-name"), Sample::from(0.5)];
        let decoded = c.choose(&samples).unwrap();
        let map = decoded.as_object().unwrap();
        assert_eq!(map["name"], ParamValue::Text("pinned-name".to_string()));
        assert_eq!(map["size"], ParamValue::Number(0.5));
    }

    #[test]
    fn text_slot_outside_string_shape_is_rejected() {
        let c = chooser(json!({ "type": "number" }));
        let err = c.choose(&[Sample::from("oops")]).unwrap_err();
        assert!(matches!(err, SchemaError::NonScalarSample { index: 0 }));
    }

    #[test]
    fn wrong_length_vector_is_rejected_both_ways() {
        let c = chooser(json!({
            "properties": {
                "a": { "type": "number" },
                "b": { "type": "number" }
            }
        }));
        let err = c.choose(&Sample::scalars([0.5])).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::SampleLength {
                expected: 2,
                actual: 1
            }
        ));
        let err = c.choose(&Sample::scalars([0.1, 0.2, 0.3])).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::SampleLength {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn repeated_decode_is_deterministic() {
        let c = chooser(json!({
            "properties": {
                "p": { "items": { "enum": [1, 2, 3] }, "minItems": 2 },
                "q": { "type": "string" },
                "r": { "type": "integer", "minimum": 0, "maximum": 100 }
            }
        }));
        let samples = Sample::scalars([0.1, 0.9, 0.42, 0.7]);
        let first = c.choose(&samples).unwrap();
        let second = c.choose(&samples).unwrap();
        assert_eq!(first, second);
    }

    /// Geographic point: the extension example — two scalars, one value.
    #[derive(Debug)]
    struct GeoPointHandler;

    impl ShapeHandler for GeoPointHandler {
        fn cardinality(&self, _chooser: &Chooser, _raw: &Value) -> Result<usize, SchemaError> {
            Ok(2)
        }

        fn choose(
            &self,
            _chooser: &Chooser,
            _raw: &Value,
            samples: &[Sample],
            at: usize,
        ) -> Result<(ParamValue, usize), SchemaError> {
            let lat = samples[at].scalar().unwrap_or(0.0) * 180.0 - 90.0;
            let lon = samples[at + 1].scalar().unwrap_or(0.0) * 360.0 - 180.0;
            let mut map = BTreeMap::new();
            map.insert("lat".to_string(), ParamValue::Number(lat));
            map.insert("lon".to_string(), ParamValue::Number(lon));
            Ok((ParamValue::Object(map), at + 2))
        }
    }

    #[test]
    fn custom_type_handler_extends_the_engine() {
        let registry = HandlerRegistry::new().with_type("geopoint", Arc::new(GeoPointHandler));
        let document = json!({
            "properties": {
                "origin": { "type": "geopoint" },
                "radius": { "type": "number", "minimum": 0, "maximum": 10 }
            }
        });
        let c = Chooser::with_registry(&document, registry).unwrap();
        assert_eq!(c.cardinality().unwrap(), 3);

        let decoded = c.choose(&Sample::scalars([0.5, 0.5, 0.1])).unwrap();
        let origin = decoded.as_object().unwrap()["origin"].as_object().unwrap();
        assert_eq!(origin["lat"], ParamValue::Number(0.0));
        assert_eq!(origin["lon"], ParamValue::Number(0.0));
    }
}
