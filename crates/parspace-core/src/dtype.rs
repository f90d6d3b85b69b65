//! # Scalar Datatype Tags
//!
//! [`DType`] declares which scalar type a parameter spec coerces values
//! into. Coercion mirrors the permissive behavior of dynamic-language
//! parameter files: numeric strings parse, integers widen to floats,
//! floats truncate to integers, and anything stringifies — but a value
//! that cannot be represented in the declared type fails with
//! [`SpecError::TypeCoercion`] rather than passing through unchecked.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::value::ParamValue;

/// Scalar datatype declared by a parameter spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    Str,
}

impl DType {
    /// Coerce a value into this datatype.
    ///
    /// Rules, per declared type:
    /// - `int`: integers pass; floats truncate toward zero; strings must
    ///   parse as integers; booleans map to 0/1.
    /// - `float`: floats pass; integers widen; strings must parse.
    /// - `str`: strings pass; `null` becomes the empty string; numbers
    ///   and booleans stringify.
    pub fn coerce(&self, value: &ParamValue) -> Result<ParamValue, SpecError> {
        let fail = || SpecError::TypeCoercion {
            expected: *self,
            value: format!("{value:?}"),
        };

        match self {
            Self::Int => match value {
                ParamValue::Integer(i) => Ok(ParamValue::Integer(*i)),
                ParamValue::Number(n) if n.is_finite() => Ok(ParamValue::Integer(n.trunc() as i64)),
                ParamValue::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(ParamValue::Integer)
                    .map_err(|_| fail()),
                ParamValue::Bool(b) => Ok(ParamValue::Integer(i64::from(*b))),
                _ => Err(fail()),
            },
            Self::Float => match value {
                ParamValue::Number(n) => Ok(ParamValue::Number(*n)),
                ParamValue::Integer(i) => Ok(ParamValue::Number(*i as f64)),
                ParamValue::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(ParamValue::Number)
                    .map_err(|_| fail()),
                _ => Err(fail()),
            },
            Self::Str => match value {
                ParamValue::Text(s) => Ok(ParamValue::Text(s.clone())),
                ParamValue::Null => Ok(ParamValue::Text(String::new())),
                ParamValue::Integer(i) => Ok(ParamValue::Text(i.to_string())),
                ParamValue::Number(n) => Ok(ParamValue::Text(n.to_string())),
                ParamValue::Bool(b) => Ok(ParamValue::Text(b.to_string())),
                _ => Err(fail()),
            },
        }
    }

    /// Whether a value already has this datatype (no coercion applied).
    pub fn matches(&self, value: &ParamValue) -> bool {
        matches!(
            (self, value),
            (Self::Int, ParamValue::Integer(_))
                | (Self::Float, ParamValue::Number(_))
                | (Self::Str, ParamValue::Text(_))
        )
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
        }
    }
}

impl FromStr for DType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "str" => Ok(Self::Str),
            other => Err(SpecError::MalformedSpec {
                name: String::new(),
                reason: format!("unknown dtype {other:?}; use one of int, float, str"),
            }),
        }
    }
}
