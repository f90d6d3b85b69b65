//! End-to-end exploration flows: schema in, cardinality out, sample
//! vectors decoded to parameter sets that pass conformance validation
//! against the very schema that produced them.

use proptest::prelude::*;
use serde_json::json;

use parspace_core::{ParamValue, Sample};
use parspace_schema::Chooser;

/// A representative simulation-input schema: nested objects, references,
/// a conjunction, an array, an enum, and bounded primitives.
fn simulation_schema() -> serde_json::Value {
    json!({
        "definitions": {
            "unit": { "type": "number", "minimum": 0, "maximum": 1 }
        },
        "type": "object",
        "properties": {
            "grid": {
                "type": "object",
                "properties": {
                    "width": { "type": "integer", "minimum": 1, "maximum": 100 },
                    "height": { "type": "integer", "minimum": 1, "maximum": 100 }
                }
            },
            "mixing": { "$ref": "#/definitions/unit" },
            "mode": { "enum": ["fast", "accurate", "debug"] },
            "weights": {
                "type": "array",
                "items": { "$ref": "#/definitions/unit" },
                "minItems": 3,
                "maxItems": 8
            },
            "label": { "type": "string", "minLength": 6, "maxLength": 6 }
        }
    })
}

#[test]
fn cardinality_counts_the_whole_tree() {
    let chooser = Chooser::new(&simulation_schema()).unwrap();
    // grid.width + grid.height + mixing + mode + 3 weights + label
    assert_eq!(chooser.cardinality().unwrap(), 8);
}

#[test]
fn decoded_sets_conform_to_their_own_schema() {
    let chooser = Chooser::new(&simulation_schema()).unwrap();
    let conformance = chooser.conformance().unwrap();

    let samples = Sample::scalars([0.1, 0.9, 0.99, 0.3, 0.5, 0.0, 0.42, 0.7]);
    let decoded = chooser.choose(&samples).unwrap();

    let as_json = decoded.to_json().expect("bounded decode is finite");
    conformance
        .validate(&as_json)
        .expect("decode output must conform to its schema");
}

#[test]
fn conjunction_decodes_against_one_cursor() {
    let document = json!({
        "allOf": [
            { "properties": { "alpha": { "type": "number", "minimum": 0, "maximum": 1 } } },
            { "properties": { "beta": { "enum": [10, 20, 30] } } }
        ]
    });
    let chooser = Chooser::new(&document).unwrap();
    assert_eq!(chooser.cardinality().unwrap(), 2);

    let decoded = chooser.choose(&Sample::scalars([0.5, 0.99])).unwrap();
    let map = decoded.as_object().unwrap();
    assert_eq!(map["alpha"], ParamValue::Number(0.5));
    assert_eq!(map["beta"], ParamValue::Integer(30));
}

proptest! {
    /// Any exact-length vector decodes fully: no under-read, no leftover,
    /// and the same vector always decodes to the same value.
    #[test]
    fn exact_length_vectors_decode_deterministically(
        raw in proptest::collection::vec(0.0f64..1.0, 8)
    ) {
        let chooser = Chooser::new(&simulation_schema()).unwrap();
        let samples = Sample::scalars(raw);

        let first = chooser.choose(&samples).unwrap();
        let second = chooser.choose(&samples).unwrap();
        prop_assert_eq!(&first, &second);

        // Shape mirrors the schema regardless of the scalars drawn.
        let map = first.as_object().unwrap();
        prop_assert_eq!(map.len(), 5);
        prop_assert_eq!(map["weights"].as_list().unwrap().len(), 3);
        prop_assert_eq!(map["label"].as_str().unwrap().len(), 6);
    }

    /// Every decoded set passes conformance validation against the
    /// schema that produced it.
    #[test]
    fn round_trip_always_validates(
        raw in proptest::collection::vec(0.0f64..1.0, 8)
    ) {
        let chooser = Chooser::new(&simulation_schema()).unwrap();
        let conformance = chooser.conformance().unwrap();

        let decoded = chooser.choose(&Sample::scalars(raw)).unwrap();
        let as_json = decoded.to_json().expect("bounded decode is finite");
        prop_assert!(conformance.is_valid(&as_json));
    }

    /// Bounded numeric decodes always land inside their interval.
    #[test]
    fn bounded_numbers_stay_in_bounds(x in 0.0f64..1.0) {
        let chooser = Chooser::new(
            &json!({ "type": "number", "minimum": -3.5, "maximum": 12.25 })
        ).unwrap();
        let decoded = chooser.choose(&Sample::scalars([x])).unwrap();
        let value = decoded.as_f64().unwrap();
        prop_assert!((-3.5..=12.25).contains(&value));
    }

    /// Half-bounded decodes respect their single bound.
    #[test]
    fn half_bounded_numbers_respect_the_bound(x in 0.0f64..1.0) {
        let above = Chooser::new(&json!({ "type": "number", "minimum": 2.0 })).unwrap();
        let decoded = above.choose(&Sample::scalars([x])).unwrap();
        prop_assert!(decoded.as_f64().unwrap() >= 2.0);

        let below = Chooser::new(&json!({ "type": "number", "maximum": 2.0 })).unwrap();
        let decoded = below.choose(&Sample::scalars([x])).unwrap();
        prop_assert!(decoded.as_f64().unwrap() <= 2.0);
    }
}
