//! # Parameter Spec Kinds
//!
//! One tagged [`ParamSpec`] variant per constraint kind, each owning its
//! coercion, domain validation, and scalar decoding. Descriptors parse
//! from JSON documents of the form
//! `{ "name": "a", "type": "interval", "min": 0, "max": 4 }`.
//!
//! Construction-time invariants (bounds ordering, non-empty choices,
//! known kinds and dtypes) fail fast with
//! [`SpecError::MalformedSpec`] — a spec object is reused across many
//! decodes and must never carry a latent violation into them.

use std::collections::BTreeMap;

use serde_json::Value;

use parspace_core::{DType, ParamValue, Sample, SpecError};
use parspace_schema::primitives::{enum_index, hex_string, remap_unit, DEFAULT_STRING_LENGTH};

// ---------------------------------------------------------------------------
// ParamSpec
// ---------------------------------------------------------------------------

/// A named, typed parameter constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSpec {
    /// Numeric interval with optional bounds.
    Interval(IntervalSpec),
    /// Fixed set of allowed values.
    Choice(ChoiceSpec),
    /// String with length bounds.
    Str(StringSpec),
    /// Homogeneous list with a single contents spec.
    List(ListSpec),
    /// Exactly one literal value.
    Fixed(FixedSpec),
    /// 2D point with `x`/`y` intervals and optional extra properties.
    Point2D(Point2DSpec),
}

impl ParamSpec {
    /// Parse a descriptor document into a spec.
    pub fn parse(descriptor: &Value) -> Result<Self, SpecError> {
        let name = descriptor
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SpecError::MalformedSpec {
                name: String::new(),
                reason: "descriptor must declare a name".to_string(),
            })?;
        Self::parse_named(descriptor, name)
    }

    /// Parse a descriptor, falling back to `name` when the descriptor
    /// does not declare one (list contents specs are anonymous).
    fn parse_named(descriptor: &Value, name: &str) -> Result<Self, SpecError> {
        let malformed = |reason: String| SpecError::MalformedSpec {
            name: name.to_string(),
            reason,
        };

        let obj = descriptor
            .as_object()
            .ok_or_else(|| malformed(format!("descriptor must be an object, got {descriptor}")))?;
        let name = obj.get("name").and_then(Value::as_str).unwrap_or(name);
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("descriptor must declare a type".to_string()))?;

        let default = obj.get("default").map(ParamValue::from_json);

        match kind {
            "interval" => {
                let dtype = parse_dtype(obj, name, DType::Float)?;
                Ok(Self::Interval(IntervalSpec::new(
                    name,
                    field_number(obj, "min", name)?,
                    field_number(obj, "max", name)?,
                    default.as_ref(),
                    dtype,
                )?))
            }
            "choice" => {
                let dtype = parse_dtype(obj, name, DType::Str)?;
                let choices = obj
                    .get("choices")
                    .and_then(Value::as_array)
                    .ok_or_else(|| malformed("choices must be provided as a list".to_string()))?;
                let choices: Vec<ParamValue> = choices.iter().map(ParamValue::from_json).collect();
                Ok(Self::Choice(ChoiceSpec::new(
                    name,
                    choices,
                    default.as_ref(),
                    dtype,
                )?))
            }
            "str" | "string" => Ok(Self::Str(StringSpec::new(
                name,
                field_length(obj, "min_length", name)?,
                field_length(obj, "max_length", name)?,
                default.as_ref(),
            )?)),
            "list" => {
                let contents = obj
                    .get("contents")
                    .ok_or_else(|| malformed("list requires a contents spec".to_string()))?;
                let contents = Self::parse_named(contents, name)?;
                Ok(Self::List(ListSpec::new(
                    name,
                    contents,
                    field_length(obj, "min_length", name)?.unwrap_or(0),
                    field_length(obj, "max_length", name)?,
                )?))
            }
            "fixed" => {
                let value = obj
                    .get("value")
                    .ok_or_else(|| malformed("fixed requires a value".to_string()))?;
                Ok(Self::Fixed(FixedSpec::new(name, ParamValue::from_json(value))))
            }
            "point2d" => {
                let axis = |key: &str| -> Result<IntervalSpec, SpecError> {
                    match obj.get(key) {
                        None => IntervalSpec::new(
                            &format!("{name}.{key}"),
                            None,
                            None,
                            None,
                            DType::Float,
                        ),
                        Some(sub) => {
                            let sub_obj = sub.as_object().ok_or_else(|| {
                                malformed(format!("{key} axis must be an object"))
                            })?;
                            IntervalSpec::new(
                                &format!("{name}.{key}"),
                                field_number(sub_obj, "min", name)?,
                                field_number(sub_obj, "max", name)?,
                                None,
                                parse_dtype(sub_obj, name, DType::Float)?,
                            )
                        }
                    }
                };

                let mut extras = BTreeMap::new();
                if let Some(props) = obj.get("properties") {
                    let props = props.as_array().ok_or_else(|| {
                        malformed("point2d properties must be a list of descriptors".to_string())
                    })?;
                    for prop in props {
                        let spec = Self::parse(prop)?;
                        extras.insert(spec.name().to_string(), spec);
                    }
                }

                Ok(Self::Point2D(Point2DSpec::new(
                    name,
                    axis("x")?,
                    axis("y")?,
                    extras,
                )?))
            }
            other => Err(malformed(format!("parameter type {other:?} not recognized"))),
        }
    }

    /// The parameter name this spec declares.
    pub fn name(&self) -> &str {
        match self {
            Self::Interval(s) => &s.name,
            Self::Choice(s) => &s.name,
            Self::Str(s) => &s.name,
            Self::List(s) => &s.name,
            Self::Fixed(s) => &s.name,
            Self::Point2D(s) => &s.name,
        }
    }

    /// The default value, when the spec defines one.
    pub fn default(&self) -> Option<ParamValue> {
        match self {
            Self::Interval(s) => Some(s.default.clone()),
            Self::Choice(s) => Some(s.default.clone()),
            Self::Str(s) => s.default.clone(),
            Self::List(_) => None,
            Self::Fixed(s) => Some(s.value.clone()),
            Self::Point2D(s) => s.default(),
        }
    }

    /// Coerce a value to this spec's datatype without domain checks.
    pub fn coerce(&self, value: &ParamValue) -> Result<ParamValue, SpecError> {
        match self {
            Self::Interval(s) => s.dtype.coerce(value),
            Self::Choice(s) => s.dtype.coerce(value),
            Self::Str(_) => DType::Str.coerce(value),
            Self::List(s) => s.coerce(value),
            Self::Fixed(_) => Ok(value.clone()),
            Self::Point2D(s) => s.coerce(value),
        }
    }

    /// Whether an (already coerced) value satisfies this spec's domain.
    pub fn is_valid(&self, value: &ParamValue) -> bool {
        match self {
            Self::Interval(s) => s.is_valid(value),
            Self::Choice(s) => s.is_valid(value),
            Self::Str(s) => s.is_valid(value),
            Self::List(_) | Self::Point2D(_) => self.validate(value).is_ok(),
            Self::Fixed(s) => s.is_valid(value),
        }
    }

    /// Coerce and domain-check a value, returning the coerced result.
    pub fn validate(&self, value: &ParamValue) -> Result<ParamValue, SpecError> {
        match self {
            Self::List(s) => s.validate(value),
            Self::Point2D(s) => s.validate(value),
            _ => {
                let coerced = self.coerce(value)?;
                if self.is_valid(&coerced) {
                    Ok(coerced)
                } else {
                    Err(SpecError::InvalidValue {
                        name: self.name().to_string(),
                        reason: format!("{coerced:?} is outside the declared domain"),
                    })
                }
            }
        }
    }

    /// Number of independent scalars one decode of this spec consumes.
    pub fn num_samples(&self) -> usize {
        match self {
            Self::Interval(_) | Self::Choice(_) | Self::Str(_) => 1,
            Self::List(s) => s.contents.num_samples() * s.min_len,
            Self::Fixed(_) => 0,
            Self::Point2D(s) => {
                2 + s.extras.values().map(ParamSpec::num_samples).sum::<usize>()
            }
        }
    }

    /// Decode one value starting at cursor `at`, returning the value and
    /// the next unused cursor position.
    pub fn choose(&self, samples: &[Sample], at: usize) -> Result<(ParamValue, usize), SpecError> {
        match self {
            Self::Interval(s) => Ok((s.choose(scalar_at(&s.name, samples, at)?), at + 1)),
            Self::Choice(s) => Ok((s.choose(scalar_at(&s.name, samples, at)?), at + 1)),
            Self::Str(s) => match sample_at(&s.name, samples, at)? {
                Sample::Text(text) => Ok((ParamValue::Text(text.clone()), at + 1)),
                Sample::Scalar(x) => Ok((ParamValue::Text(s.choose(*x)), at + 1)),
            },
            Self::List(s) => {
                let mut decoded = Vec::with_capacity(s.min_len);
                let mut cursor = at;
                for _ in 0..s.min_len {
                    let (value, next) = s.contents.choose(samples, cursor)?;
                    decoded.push(value);
                    cursor = next;
                }
                Ok((ParamValue::List(decoded), cursor))
            }
            // A fixed spec decodes to its literal regardless of input.
            Self::Fixed(s) => Ok((s.value.clone(), at)),
            Self::Point2D(s) => {
                let x = s.x.choose(scalar_at(&s.name, samples, at)?);
                let y = s.y.choose(scalar_at(&s.name, samples, at + 1)?);
                let mut map = BTreeMap::new();
                map.insert("x".to_string(), x);
                map.insert("y".to_string(), y);
                let mut cursor = at + 2;
                for (extra_name, extra) in &s.extras {
                    let (value, next) = extra.choose(samples, cursor)?;
                    map.insert(extra_name.clone(), value);
                    cursor = next;
                }
                Ok((ParamValue::Object(map), cursor))
            }
        }
    }

    /// Convenience decode from a single scalar, replicated across however
    /// many slots the spec consumes.
    pub fn choose_one(&self, x: f64) -> Result<ParamValue, SpecError> {
        let samples = vec![Sample::Scalar(x); self.num_samples()];
        self.choose(&samples, 0).map(|(value, _)| value)
    }
}

// ---------------------------------------------------------------------------
// IntervalSpec
// ---------------------------------------------------------------------------

/// Numeric interval `[min, max]`; unspecified bounds default to `±inf`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSpec {
    /// Parameter name.
    pub name: String,
    /// Lower bound (`-inf` when unspecified).
    pub min: f64,
    /// Upper bound (`+inf` when unspecified).
    pub max: f64,
    /// Declared scalar datatype (`int` or `float`).
    pub dtype: DType,
    /// Default: midpoint when both bounds are finite, the finite bound
    /// when one-sided, zero when unbounded.
    pub default: ParamValue,
}

impl IntervalSpec {
    /// Construct and check invariants.
    pub fn new(
        name: &str,
        min: Option<f64>,
        max: Option<f64>,
        default: Option<&ParamValue>,
        dtype: DType,
    ) -> Result<Self, SpecError> {
        let malformed = |reason: String| SpecError::MalformedSpec {
            name: name.to_string(),
            reason,
        };

        if dtype == DType::Str {
            return Err(malformed("interval dtype must be numeric".to_string()));
        }

        let lo = min.unwrap_or(f64::NEG_INFINITY);
        let hi = max.unwrap_or(f64::INFINITY);
        if lo > hi {
            return Err(malformed(format!(
                "minimum {lo} must not exceed maximum {hi}"
            )));
        }

        let default = match default {
            Some(value) => dtype.coerce(value)?,
            None => {
                let center = match (lo.is_finite(), hi.is_finite()) {
                    (true, true) => (lo + hi) / 2.0,
                    (true, false) => lo,
                    (false, true) => hi,
                    (false, false) => 0.0,
                };
                dtype.coerce(&ParamValue::Number(center))?
            }
        };

        let spec = Self {
            name: name.to_string(),
            min: lo,
            max: hi,
            dtype,
            default,
        };
        if !spec.is_valid(&spec.default) {
            return Err(malformed(format!(
                "default {:?} lies outside [{lo}, {hi}]",
                spec.default
            )));
        }
        Ok(spec)
    }

    /// Whether a coerced value lies in the interval.
    pub fn is_valid(&self, value: &ParamValue) -> bool {
        self.dtype.matches(value)
            && value
                .as_f64()
                .is_some_and(|v| v >= self.min && v <= self.max)
    }

    /// Decode a `[0,1)` scalar into the interval.
    pub fn choose(&self, x: f64) -> ParamValue {
        let minimum = self.min.is_finite().then_some(self.min);
        let maximum = self.max.is_finite().then_some(self.max);
        let value = remap_unit(x, minimum, maximum);
        match self.dtype {
            DType::Int => ParamValue::Integer(value.trunc() as i64),
            _ => ParamValue::Number(value),
        }
    }
}

// ---------------------------------------------------------------------------
// ChoiceSpec
// ---------------------------------------------------------------------------

/// A fixed, sorted set of allowed values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSpec {
    /// Parameter name.
    pub name: String,
    /// Coerced choices, sorted.
    pub choices: Vec<ParamValue>,
    /// Declared scalar datatype.
    pub dtype: DType,
    /// Default: the first declared choice when none is given.
    pub default: ParamValue,
}

impl ChoiceSpec {
    /// Construct and check invariants.
    pub fn new(
        name: &str,
        choices: Vec<ParamValue>,
        default: Option<&ParamValue>,
        dtype: DType,
    ) -> Result<Self, SpecError> {
        let malformed = |reason: String| SpecError::MalformedSpec {
            name: name.to_string(),
            reason,
        };

        if choices.is_empty() {
            return Err(malformed("at least one choice is required".to_string()));
        }

        let mut coerced = choices
            .iter()
            .map(|c| dtype.coerce(c))
            .collect::<Result<Vec<_>, _>>()?;

        // Default is the first *declared* choice, before sorting.
        let default = match default {
            Some(value) => dtype.coerce(value)?,
            None => coerced[0].clone(),
        };

        coerced.sort_by(order_values);
        if !coerced.contains(&default) {
            return Err(malformed(format!(
                "default {default:?} is not one of the choices"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            choices: coerced,
            dtype,
            default,
        })
    }

    /// Whether a coerced value is one of the choices.
    pub fn is_valid(&self, value: &ParamValue) -> bool {
        self.dtype.matches(value) && self.choices.contains(value)
    }

    /// Decode a `[0,1)` scalar into a choice by index.
    pub fn choose(&self, x: f64) -> ParamValue {
        self.choices[enum_index(x, self.choices.len())].clone()
    }
}

/// Total order over homogeneous coerced choice values.
fn order_values(a: &ParamValue, b: &ParamValue) -> std::cmp::Ordering {
    match (a, b) {
        (ParamValue::Integer(x), ParamValue::Integer(y)) => x.cmp(y),
        (ParamValue::Text(x), ParamValue::Text(y)) => x.cmp(y),
        _ => a
            .as_f64()
            .unwrap_or(f64::NAN)
            .total_cmp(&b.as_f64().unwrap_or(f64::NAN)),
    }
}

// ---------------------------------------------------------------------------
// StringSpec
// ---------------------------------------------------------------------------

/// String with optional length bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct StringSpec {
    /// Parameter name.
    pub name: String,
    /// Minimum length; validation treats absence as 0.
    pub min_len: Option<usize>,
    /// Maximum length; validation treats absence as unbounded.
    pub max_len: Option<usize>,
    /// Optional default.
    pub default: Option<ParamValue>,
}

impl StringSpec {
    /// Construct and check invariants.
    pub fn new(
        name: &str,
        min_len: Option<usize>,
        max_len: Option<usize>,
        default: Option<&ParamValue>,
    ) -> Result<Self, SpecError> {
        if let (Some(lo), Some(hi)) = (min_len, max_len) {
            if lo > hi {
                return Err(SpecError::MalformedSpec {
                    name: name.to_string(),
                    reason: format!("min_length {lo} must not exceed max_length {hi}"),
                });
            }
        }

        let default = default.map(|v| DType::Str.coerce(v)).transpose()?;
        let spec = Self {
            name: name.to_string(),
            min_len,
            max_len,
            default,
        };
        if let Some(ref d) = spec.default {
            if !spec.is_valid(d) {
                return Err(SpecError::MalformedSpec {
                    name: spec.name,
                    reason: format!("default {d:?} violates the length bounds"),
                });
            }
        }
        Ok(spec)
    }

    /// Whether a coerced value satisfies the length bounds.
    ///
    /// Lengths count characters, not bytes, matching how `minLength` and
    /// `maxLength` are measured in schema conformance.
    pub fn is_valid(&self, value: &ParamValue) -> bool {
        value.as_str().is_some_and(|s| {
            let length = s.chars().count();
            length >= self.min_len.unwrap_or(0) && length <= self.max_len.unwrap_or(usize::MAX)
        })
    }

    /// Decode a `[0,1)` scalar into a hex string; sampled length is
    /// `min(min_length defaulting to 10, max_length)`.
    pub fn choose(&self, x: f64) -> String {
        let length = self
            .min_len
            .unwrap_or(DEFAULT_STRING_LENGTH)
            .min(self.max_len.unwrap_or(usize::MAX));
        hex_string(x, length)
    }
}

// ---------------------------------------------------------------------------
// ListSpec
// ---------------------------------------------------------------------------

/// Homogeneous list; every element validates against one contents spec.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSpec {
    /// Parameter name.
    pub name: String,
    /// Spec every element must satisfy.
    pub contents: Box<ParamSpec>,
    /// Minimum length; sampling materializes exactly this many elements.
    pub min_len: usize,
    /// Maximum length, if bounded.
    pub max_len: Option<usize>,
}

impl ListSpec {
    /// Construct and check invariants.
    pub fn new(
        name: &str,
        contents: ParamSpec,
        min_len: usize,
        max_len: Option<usize>,
    ) -> Result<Self, SpecError> {
        if let Some(hi) = max_len {
            if min_len > hi {
                return Err(SpecError::MalformedSpec {
                    name: name.to_string(),
                    reason: format!("min_length {min_len} must not exceed max_length {hi}"),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            contents: Box::new(contents),
            min_len,
            max_len,
        })
    }

    fn coerce(&self, value: &ParamValue) -> Result<ParamValue, SpecError> {
        let items = value.as_list().ok_or_else(|| SpecError::InvalidValue {
            name: self.name.clone(),
            reason: format!("expected a list, got {}", value.kind()),
        })?;
        let coerced = items
            .iter()
            .map(|item| self.contents.coerce(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ParamValue::List(coerced))
    }

    fn validate(&self, value: &ParamValue) -> Result<ParamValue, SpecError> {
        let items = value.as_list().ok_or_else(|| SpecError::InvalidValue {
            name: self.name.clone(),
            reason: format!("expected a list, got {}", value.kind()),
        })?;
        if items.len() < self.min_len || self.max_len.is_some_and(|hi| items.len() > hi) {
            return Err(SpecError::InvalidValue {
                name: self.name.clone(),
                reason: format!("list length {} violates the bounds", items.len()),
            });
        }
        let validated = items
            .iter()
            .map(|item| self.contents.validate(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ParamValue::List(validated))
    }
}

// ---------------------------------------------------------------------------
// FixedSpec
// ---------------------------------------------------------------------------

/// Exactly one literal value; consumes no samples.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSpec {
    /// Parameter name.
    pub name: String,
    /// The only valid value.
    pub value: ParamValue,
}

impl FixedSpec {
    /// Construct a fixed spec.
    pub fn new(name: &str, value: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }

    /// Whether a value equals the stored literal exactly.
    pub fn is_valid(&self, value: &ParamValue) -> bool {
        *value == self.value
    }
}

// ---------------------------------------------------------------------------
// Point2DSpec
// ---------------------------------------------------------------------------

/// A 2D point: required `x`/`y` intervals plus optional named extras.
#[derive(Debug, Clone, PartialEq)]
pub struct Point2DSpec {
    /// Parameter name.
    pub name: String,
    /// Interval constraining the `x` coordinate.
    pub x: IntervalSpec,
    /// Interval constraining the `y` coordinate.
    pub y: IntervalSpec,
    /// Extra named sub-properties; unknown names are rejected.
    pub extras: BTreeMap<String, ParamSpec>,
}

impl Point2DSpec {
    /// Construct a point spec.
    pub fn new(
        name: &str,
        x: IntervalSpec,
        y: IntervalSpec,
        extras: BTreeMap<String, ParamSpec>,
    ) -> Result<Self, SpecError> {
        for reserved in ["x", "y"] {
            if extras.contains_key(reserved) {
                return Err(SpecError::MalformedSpec {
                    name: name.to_string(),
                    reason: format!("extra property {reserved:?} collides with a coordinate"),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            x,
            y,
            extras,
        })
    }

    fn default(&self) -> Option<ParamValue> {
        let mut map = BTreeMap::new();
        map.insert("x".to_string(), self.x.default.clone());
        map.insert("y".to_string(), self.y.default.clone());
        for (name, extra) in &self.extras {
            map.insert(name.clone(), extra.default()?);
        }
        Some(ParamValue::Object(map))
    }

    fn coerce(&self, value: &ParamValue) -> Result<ParamValue, SpecError> {
        self.validate(value)
    }

    fn validate(&self, value: &ParamValue) -> Result<ParamValue, SpecError> {
        let map = value.as_object().ok_or_else(|| SpecError::InvalidValue {
            name: self.name.clone(),
            reason: format!("expected a mapping, got {}", value.kind()),
        })?;

        // Unknown property names are rejected before any coercion.
        for key in map.keys() {
            if key != "x" && key != "y" && !self.extras.contains_key(key) {
                return Err(SpecError::UnknownParameter {
                    name: format!("{}.{key}", self.name),
                });
            }
        }

        let mut validated = BTreeMap::new();
        for (axis_name, axis) in [("x", &self.x), ("y", &self.y)] {
            let raw = map.get(axis_name).ok_or_else(|| SpecError::MissingParameter {
                name: format!("{}.{axis_name}", self.name),
            })?;
            let coerced = axis.dtype.coerce(raw)?;
            if !axis.is_valid(&coerced) {
                return Err(SpecError::InvalidValue {
                    name: format!("{}.{axis_name}", self.name),
                    reason: format!("{coerced:?} is outside the declared interval"),
                });
            }
            validated.insert(axis_name.to_string(), coerced);
        }
        for (extra_name, extra) in &self.extras {
            let raw = map.get(extra_name).ok_or_else(|| SpecError::MissingParameter {
                name: format!("{}.{extra_name}", self.name),
            })?;
            validated.insert(extra_name.clone(), extra.validate(raw)?);
        }
        Ok(ParamValue::Object(validated))
    }
}

// ---------------------------------------------------------------------------
// Descriptor field helpers
// ---------------------------------------------------------------------------

fn parse_dtype(
    obj: &serde_json::Map<String, Value>,
    name: &str,
    fallback: DType,
) -> Result<DType, SpecError> {
    match obj.get("dtype") {
        None => Ok(fallback),
        Some(v) => {
            let text = v.as_str().ok_or_else(|| SpecError::MalformedSpec {
                name: name.to_string(),
                reason: format!("dtype must be a string, got {v}"),
            })?;
            text.parse::<DType>().map_err(|_| SpecError::MalformedSpec {
                name: name.to_string(),
                reason: format!("unknown dtype {text:?}; use one of int, float, str"),
            })
        }
    }
}

fn field_number(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    name: &str,
) -> Result<Option<f64>, SpecError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| SpecError::MalformedSpec {
            name: name.to_string(),
            reason: format!("{key} must be a number, got {v}"),
        }),
    }
}

fn field_length(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    name: &str,
) -> Result<Option<usize>, SpecError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| SpecError::MalformedSpec {
                name: name.to_string(),
                reason: format!("{key} must be a non-negative integer, got {v}"),
            }),
    }
}

fn sample_at<'a>(name: &str, samples: &'a [Sample], at: usize) -> Result<&'a Sample, SpecError> {
    samples.get(at).ok_or_else(|| SpecError::InvalidValue {
        name: name.to_string(),
        reason: format!("sample vector exhausted at slot {at}"),
    })
}

fn scalar_at(name: &str, samples: &[Sample], at: usize) -> Result<f64, SpecError> {
    sample_at(name, samples, at)?
        .scalar()
        .ok_or_else(|| SpecError::InvalidValue {
            name: name.to_string(),
            reason: format!("sample slot {at} holds text but a scalar is required"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interval_midpoint_default_and_choose() {
        let spec = ParamSpec::parse(&json!({
            "name": "a", "type": "interval", "min": 0, "max": 4
        }))
        .unwrap();
        assert_eq!(spec.default(), Some(ParamValue::Number(2.0)));
        assert_eq!(spec.choose_one(0.5).unwrap(), ParamValue::Number(2.0));
    }

    #[test]
    fn half_bounded_interval_defaults_to_the_finite_bound() {
        let spec = ParamSpec::parse(&json!({ "name": "a", "type": "interval", "max": 4 })).unwrap();
        assert_eq!(spec.default(), Some(ParamValue::Number(4.0)));
    }

    #[test]
    fn unbounded_interval_covers_the_whole_line() {
        let spec = ParamSpec::parse(&json!({ "name": "a", "type": "interval" })).unwrap();
        match spec {
            ParamSpec::Interval(ref s) => {
                assert_eq!(s.min, f64::NEG_INFINITY);
                assert_eq!(s.max, f64::INFINITY);
            }
            _ => panic!("expected interval"),
        }
        assert_eq!(spec.default(), Some(ParamValue::Number(0.0)));
    }

    #[test]
    fn inverted_interval_is_malformed() {
        let err =
            ParamSpec::parse(&json!({ "name": "a", "type": "interval", "min": 5, "max": 4 }))
                .unwrap_err();
        assert!(matches!(err, SpecError::MalformedSpec { .. }));
    }

    #[test]
    fn integer_interval_coerces_and_truncates() {
        let spec = ParamSpec::parse(&json!({
            "name": "n", "type": "interval", "min": 0, "max": 10, "dtype": "int"
        }))
        .unwrap();
        assert_eq!(spec.default(), Some(ParamValue::Integer(5)));
        assert_eq!(spec.choose_one(0.55).unwrap(), ParamValue::Integer(5));
        assert_eq!(
            spec.validate(&ParamValue::Text("7".to_string())).unwrap(),
            ParamValue::Integer(7)
        );
        assert!(spec.validate(&ParamValue::Integer(11)).is_err());
    }

    #[test]
    fn choice_sorts_and_defaults_to_first_declared() {
        let spec = ParamSpec::parse(&json!({
            "name": "d", "type": "choice", "choices": ["ja", "da"]
        }))
        .unwrap();
        match spec {
            ParamSpec::Choice(ref s) => {
                assert_eq!(
                    s.choices,
                    vec![
                        ParamValue::Text("da".to_string()),
                        ParamValue::Text("ja".to_string())
                    ]
                );
                assert_eq!(s.default, ParamValue::Text("ja".to_string()));
            }
            _ => panic!("expected choice"),
        }
    }

    #[test]
    fn choice_boundaries_select_first_and_last() {
        let spec = ParamSpec::parse(&json!({
            "name": "d", "type": "choice", "choices": [3, 1, 2], "dtype": "int"
        }))
        .unwrap();
        assert_eq!(spec.choose_one(0.0).unwrap(), ParamValue::Integer(1));
        assert_eq!(spec.choose_one(0.999_999).unwrap(), ParamValue::Integer(3));
    }

    #[test]
    fn malformed_choice_descriptors_are_rejected() {
        for descriptor in [
            json!({ "name": "a", "type": "choice", "choices": "not a list" }),
            json!({ "name": "a", "type": "choice", "choices": [] }),
        ] {
            let err = ParamSpec::parse(&descriptor).unwrap_err();
            assert!(matches!(err, SpecError::MalformedSpec { .. }));
        }
    }

    #[test]
    fn string_spec_bounds_and_default_length() {
        let spec = ParamSpec::parse(&json!({
            "name": "a", "type": "str", "min_length": 2, "max_length": 4
        }))
        .unwrap();
        assert!(spec.is_valid(&ParamValue::Text("ab".to_string())));
        assert!(!spec.is_valid(&ParamValue::Text("abcde".to_string())));

        let unbounded = ParamSpec::parse(&json!({ "name": "a", "type": "str" })).unwrap();
        let chosen = unbounded.choose_one(0.42).unwrap();
        assert_eq!(chosen.as_str().unwrap().len(), 10);
    }

    #[test]
    fn string_bounds_count_characters_not_bytes() {
        let spec = StringSpec::new("a", Some(2), Some(3), None).unwrap();
        // One character, two bytes: below the minimum length.
        assert!(!spec.is_valid(&ParamValue::Text("é".to_string())));
        assert!(spec.is_valid(&ParamValue::Text("éé".to_string())));
        // Four characters, eight bytes: above the maximum length.
        assert!(!spec.is_valid(&ParamValue::Text("éééé".to_string())));
    }

    #[test]
    fn malformed_string_bounds_are_rejected() {
        for descriptor in [
            json!({ "name": "a", "type": "str", "min_length": 5, "max_length": 4 }),
            json!({ "name": "a", "type": "str", "min_length": -1 }),
        ] {
            let err = ParamSpec::parse(&descriptor).unwrap_err();
            assert!(matches!(err, SpecError::MalformedSpec { .. }));
        }
    }

    #[test]
    fn fixed_spec_validates_only_its_literal() {
        let spec = ParamSpec::Fixed(FixedSpec::new("k", ParamValue::Integer(7)));
        assert!(spec.is_valid(&ParamValue::Integer(7)));
        assert!(!spec.is_valid(&ParamValue::Integer(8)));
        assert_eq!(spec.num_samples(), 0);
        assert_eq!(spec.choose(&[], 0).unwrap(), (ParamValue::Integer(7), 0));
    }

    #[test]
    fn list_spec_validates_elementwise() {
        let spec = ParamSpec::parse(&json!({
            "name": "e", "type": "list",
            "contents": { "type": "interval", "min": 0, "max": 1 },
            "min_length": 1, "max_length": 3
        }))
        .unwrap();

        let good = ParamValue::from_json(&json!([0.2, 0.8]));
        assert!(spec.validate(&good).is_ok());

        let out_of_domain = ParamValue::from_json(&json!([0.2, 1.5]));
        assert!(matches!(
            spec.validate(&out_of_domain).unwrap_err(),
            SpecError::InvalidValue { .. }
        ));

        let too_long = ParamValue::from_json(&json!([0.1, 0.2, 0.3, 0.4]));
        assert!(spec.validate(&too_long).is_err());
    }

    #[test]
    fn malformed_list_descriptors_are_rejected() {
        for descriptor in [
            json!({ "name": "a", "type": "list", "contents": {} }),
            json!({ "name": "a", "type": "list",
                    "contents": { "type": "str" }, "min_length": -1 }),
            json!({ "name": "a", "type": "list",
                    "contents": { "type": "str" }, "min_length": 5, "max_length": "4" }),
        ] {
            let err = ParamSpec::parse(&descriptor).unwrap_err();
            assert!(matches!(err, SpecError::MalformedSpec { .. }), "{descriptor}");
        }
    }

    #[test]
    fn point2d_validates_coordinates_and_extras() {
        let spec = ParamSpec::parse(&json!({
            "name": "c", "type": "point2d",
            "properties": [ { "name": "label", "type": "string" } ]
        }))
        .unwrap();

        let good = ParamValue::from_json(&json!({ "x": 0.5, "y": 3, "label": "lala" }));
        let validated = spec.validate(&good).unwrap();
        assert_eq!(validated.as_object().unwrap()["x"], ParamValue::Number(0.5));

        let missing = ParamValue::from_json(&json!({ "x": 1 }));
        assert!(matches!(
            spec.validate(&missing).unwrap_err(),
            SpecError::MissingParameter { .. }
        ));
    }

    #[test]
    fn point2d_rejects_unknown_extra_properties() {
        let spec = ParamSpec::parse(&json!({ "name": "a", "type": "point2d" })).unwrap();
        let value = ParamValue::from_json(&json!({ "x": 1, "y": 2, "rogue": 3 }));
        match spec.validate(&value).unwrap_err() {
            SpecError::UnknownParameter { name } => assert_eq!(name, "a.rogue"),
            other => panic!("expected UnknownParameter, got {other:?}"),
        }
    }

    #[test]
    fn point2d_choose_consumes_coordinates_then_extras() {
        let spec = ParamSpec::parse(&json!({
            "name": "p", "type": "point2d",
            "x": { "min": 0, "max": 10 },
            "y": { "min": 0, "max": 2 }
        }))
        .unwrap();
        assert_eq!(spec.num_samples(), 2);
        let (value, next) = spec
            .choose(&Sample::scalars([0.5, 0.5]), 0)
            .unwrap();
        assert_eq!(next, 2);
        let map = value.as_object().unwrap();
        assert_eq!(map["x"], ParamValue::Number(5.0));
        assert_eq!(map["y"], ParamValue::Number(1.0));
    }

    #[test]
    fn unknown_kind_and_dtype_are_malformed() {
        let err = ParamSpec::parse(&json!({ "name": "a", "type": "not known" })).unwrap_err();
        assert!(matches!(err, SpecError::MalformedSpec { .. }));

        let err = ParamSpec::parse(&json!({
            "name": "a", "type": "interval", "dtype": "not known"
        }))
        .unwrap_err();
        assert!(matches!(err, SpecError::MalformedSpec { .. }));
    }

    proptest::proptest! {
        /// Bounded interval decodes always land inside the interval.
        #[test]
        fn interval_choose_stays_in_bounds(x in 0.0f64..1.0) {
            let spec = IntervalSpec::new("a", Some(-3.5), Some(12.25), None, DType::Float).unwrap();
            let value = spec.choose(x).as_f64().unwrap();
            proptest::prop_assert!((-3.5..=12.25).contains(&value));
        }

        /// A choice decode always yields one of the declared choices.
        #[test]
        fn choice_choose_yields_a_member(x in 0.0f64..1.0) {
            let spec =
                ChoiceSpec::new("d", vec![1i64.into(), 2i64.into(), 3i64.into()], None, DType::Int)
                    .unwrap();
            let value = spec.choose(x);
            proptest::prop_assert!(spec.is_valid(&value));
        }
    }

    #[test]
    fn spec_choose_agrees_with_the_schema_chooser() {
        // Interval(0, 4) against { type: number, minimum: 0, maximum: 4 }.
        let spec = ParamSpec::parse(&json!({
            "name": "a", "type": "interval", "min": 0, "max": 4
        }))
        .unwrap();
        let chooser =
            parspace_schema::Chooser::new(&json!({ "type": "number", "minimum": 0, "maximum": 4 }))
                .unwrap();
        for &x in &[0.0, 0.25, 0.5, 0.999] {
            let via_spec = spec.choose_one(x).unwrap();
            let via_schema = chooser.choose(&Sample::scalars([x])).unwrap();
            assert_eq!(via_spec, via_schema);
        }
    }
}
