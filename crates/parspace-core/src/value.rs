//! # Parameter Value Tree & Sample Slots
//!
//! [`ParamValue`] is the plain value tree produced by decoding a schema:
//! scalars, ordered lists, and name-keyed mappings mirroring the schema's
//! shape. Mappings use `BTreeMap` so iteration is always name-sorted —
//! the same lexicographic order the value chooser consumes samples in.
//!
//! [`Sample`] is one slot of a sample vector. Slots are normally `[0,1)`
//! scalars, but the string decoder accepts pre-chosen text slots so a
//! caller can pin a string parameter while sampling the rest.

use std::collections::BTreeMap;

use serde_json::Value;

// ---------------------------------------------------------------------------
// ParamValue
// ---------------------------------------------------------------------------

/// A decoded parameter value.
///
/// Produced fresh per decode; no aliasing with the schema or the sample
/// vector. `Number` may hold `±inf` (the unbounded numeric decode maps
/// a zero scalar to exactly `-inf`), which is why this is a dedicated
/// tree rather than `serde_json::Value`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// JSON null.
    Null,
    /// Boolean literal (only reachable through enums and fixed specs).
    Bool(bool),
    /// Floating-point number; may be non-finite.
    Number(f64),
    /// Integer number, kept distinct so integer schemas decode losslessly.
    Integer(i64),
    /// String value.
    Text(String),
    /// Ordered list.
    List(Vec<ParamValue>),
    /// Name-keyed mapping; iteration order is lexicographic by name.
    Object(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Short tag for error messages and dispatch logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::Text(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    /// Numeric view: `Number` as-is, `Integer` widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer view (exact `Integer` variant only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// String view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// List view.
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Mapping view.
    pub fn as_object(&self) -> Option<&BTreeMap<String, ParamValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a JSON document into a value tree.
    ///
    /// JSON numbers that fit `i64` become [`ParamValue::Integer`]; all
    /// other numbers become [`ParamValue::Number`].
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back to JSON.
    ///
    /// Returns `None` if any number in the tree is non-finite — JSON has
    /// no representation for `±inf`/`NaN`. Use [`ParamValue::to_json_lossy`]
    /// when a textual stand-in is acceptable.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Null => Some(Value::Null),
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number),
            Self::Integer(i) => Some(Value::Number((*i).into())),
            Self::Text(s) => Some(Value::String(s.clone())),
            Self::List(items) => items
                .iter()
                .map(Self::to_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Self::Object(map) => map
                .iter()
                .map(|(k, v)| v.to_json().map(|j| (k.clone(), j)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(Value::Object),
        }
    }

    /// Convert to JSON, rendering non-finite numbers as the strings
    /// `"inf"`, `"-inf"`, and `"nan"`.
    pub fn to_json_lossy(&self) -> Value {
        match self {
            Self::Number(n) if n.is_infinite() && *n > 0.0 => Value::String("inf".to_string()),
            Self::Number(n) if n.is_infinite() => Value::String("-inf".to_string()),
            Self::Number(n) if n.is_nan() => Value::String("nan".to_string()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json_lossy).collect()),
            Self::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json_lossy()))
                    .collect(),
            ),
            other => other
                .to_json()
                .unwrap_or_else(|| Value::String(format!("{other:?}"))),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// One slot of a sample vector.
///
/// A sample vector is consumed left-to-right by a single decode; slots are
/// never replayed. Scalar slots must lie in `[0,1)`. Text slots are passed
/// through unchanged by the string decoder and rejected by every other
/// decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// A uniform random scalar in `[0,1)`.
    Scalar(f64),
    /// A pre-chosen string value for a string-typed slot.
    Text(String),
}

impl Sample {
    /// Scalar view.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(x) => Some(*x),
            Self::Text(_) => None,
        }
    }

    /// Text view.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Scalar(_) => None,
        }
    }

    /// Build a sample vector from plain scalars.
    pub fn scalars<I: IntoIterator<Item = f64>>(values: I) -> Vec<Sample> {
        values.into_iter().map(Sample::Scalar).collect()
    }
}

impl From<f64> for Sample {
    fn from(x: f64) -> Self {
        Self::Scalar(x)
    }
}

impl From<&str> for Sample {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Sample {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
