//! # Schema Node Grammar
//!
//! Parses the JSON-Schema subset used for parameter spaces into a tagged
//! [`SchemaNode`] variant. Parsing happens once, at schema-load time; the
//! cardinality counter and value chooser then dispatch by pattern match
//! instead of probing raw documents for keywords on every decode.
//!
//! ## Keyword priority
//!
//! A degenerate raw node may carry more than one structural keyword. The
//! first match in fixed priority order wins and the rest are silently
//! ignored:
//!
//! ```text
//! properties > items > enum > $ref > allOf > (registered keywords) > type
//! ```
//!
//! Registered custom keywords either take over a built-in slot (override)
//! or are probed after the built-ins, in registration order. If nothing
//! matches, the node falls back to its declared `type` (`number`,
//! `integer`, `string`, or a registered type name); with no match at all,
//! parsing fails with [`SchemaError::UnrecognizedSchema`].

use std::collections::BTreeMap;

use serde_json::Value;

use parspace_core::{ParamValue, SchemaError};

use crate::registry::HandlerRegistry;

/// Structural keywords probed before the `type` fallback, in priority order.
pub const STRUCTURAL_KEYWORDS: &[&str] = &["properties", "items", "enum", "$ref", "allOf"];

/// Primitive `type` values with built-in decoders.
pub const PRIMITIVE_TYPES: &[&str] = &["number", "integer", "string"];

/// How a custom node was matched during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerKey {
    /// Matched on the presence of a structural keyword.
    Keyword(String),
    /// Matched on the declared `type` value.
    Type(String),
}

impl std::fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "keyword {k}"),
            Self::Type(t) => write!(f, "type {t}"),
        }
    }
}

/// A parsed schema node.
///
/// One tag per node — the ambiguous multiple-keyword case is resolved at
/// parse time, never during a decode. Nodes are immutable for the
/// lifetime of an exploration run and safe to share across decodes.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `properties`: mapping from property name to child schema.
    Object {
        /// Child schemas; `BTreeMap` fixes lexicographic decode order.
        properties: BTreeMap<String, SchemaNode>,
    },
    /// `items`: homogeneous array with length bounds.
    Array {
        /// Item schema.
        items: Box<SchemaNode>,
        /// Sampling always materializes exactly this many items.
        min_items: usize,
        /// Upper bound; validation-only, never drives sampling.
        max_items: Option<usize>,
    },
    /// `enum`: ordered sequence of literal values.
    Enum {
        /// The allowed literals, in declaration order.
        values: Vec<ParamValue>,
    },
    /// `$ref`: resolved through the [`Resolver`](crate::resolver::Resolver).
    Ref {
        /// The reference URI (fragment JSON pointer).
        reference: String,
    },
    /// `allOf`: conjunction of schemas decoded against one cursor.
    AllOf {
        /// Branch schemas, in declaration order.
        branches: Vec<SchemaNode>,
    },
    /// `type: number` with optional bounds.
    Number {
        /// Lower bound; absent means unbounded below.
        minimum: Option<f64>,
        /// Upper bound; absent means unbounded above.
        maximum: Option<f64>,
    },
    /// `type: integer` with optional bounds.
    Integer {
        /// Lower bound; absent means unbounded below.
        minimum: Option<f64>,
        /// Upper bound; absent means unbounded above.
        maximum: Option<f64>,
    },
    /// `type: string` with optional length bounds.
    String {
        /// Minimum length; the sampled length when present.
        min_length: Option<usize>,
        /// Maximum length; caps the sampled length.
        max_length: Option<usize>,
    },
    /// A node claimed by a registered custom handler; kept raw because
    /// only the handler knows its structure.
    Custom {
        /// Which registration matched.
        key: HandlerKey,
        /// The raw schema node, handed to the handler on every call.
        raw: Value,
    },
}

impl SchemaNode {
    /// Parse a raw schema document into a tagged node.
    ///
    /// `context` is a JSON-pointer-ish path used in error messages.
    pub fn parse(
        raw: &Value,
        registry: &HandlerRegistry,
        context: &str,
    ) -> Result<Self, SchemaError> {
        let obj = raw.as_object().ok_or_else(|| SchemaError::Malformed {
            context: context.to_string(),
            reason: format!("schema node must be an object, got {raw}"),
        })?;

        // Structural keywords first, in fixed priority order. A custom
        // registration for a built-in keyword overrides the built-in parse.
        for keyword in STRUCTURAL_KEYWORDS {
            if !obj.contains_key(*keyword) {
                continue;
            }
            if registry.keyword_handler(keyword).is_some() {
                return Ok(Self::Custom {
                    key: HandlerKey::Keyword((*keyword).to_string()),
                    raw: raw.clone(),
                });
            }
            return Self::parse_structural(keyword, obj, registry, context);
        }

        // Registered custom keywords, in registration order.
        for keyword in registry.keyword_names() {
            if obj.contains_key(keyword) {
                return Ok(Self::Custom {
                    key: HandlerKey::Keyword(keyword.to_string()),
                    raw: raw.clone(),
                });
            }
        }

        // No structural keyword present: fall back to the declared type.
        if let Some(type_name) = obj.get("type").and_then(Value::as_str) {
            if registry.type_handler(type_name).is_some() {
                return Ok(Self::Custom {
                    key: HandlerKey::Type(type_name.to_string()),
                    raw: raw.clone(),
                });
            }
            match type_name {
                "number" => {
                    return Ok(Self::Number {
                        minimum: field_f64(obj, "minimum", context)?,
                        maximum: field_f64(obj, "maximum", context)?,
                    })
                }
                "integer" => {
                    return Ok(Self::Integer {
                        minimum: field_f64(obj, "minimum", context)?,
                        maximum: field_f64(obj, "maximum", context)?,
                    })
                }
                "string" => {
                    return Ok(Self::String {
                        min_length: field_usize(obj, "minLength", context)?,
                        max_length: field_usize(obj, "maxLength", context)?,
                    })
                }
                _ => {}
            }
        }

        Err(SchemaError::UnrecognizedSchema {
            node: compact(raw),
        })
    }

    fn parse_structural(
        keyword: &str,
        obj: &serde_json::Map<String, Value>,
        registry: &HandlerRegistry,
        context: &str,
    ) -> Result<Self, SchemaError> {
        match keyword {
            "properties" => {
                let props = obj["properties"]
                    .as_object()
                    .ok_or_else(|| SchemaError::Malformed {
                        context: context.to_string(),
                        reason: "properties must be an object".to_string(),
                    })?;
                let mut properties = BTreeMap::new();
                for (name, child) in props {
                    let child_context = format!("{context}/properties/{name}");
                    properties.insert(
                        name.clone(),
                        SchemaNode::parse(child, registry, &child_context)?,
                    );
                }
                Ok(Self::Object { properties })
            }
            "items" => {
                let child_context = format!("{context}/items");
                let items = SchemaNode::parse(&obj["items"], registry, &child_context)?;
                Ok(Self::Array {
                    items: Box::new(items),
                    min_items: field_usize(obj, "minItems", context)?.unwrap_or(0),
                    max_items: field_usize(obj, "maxItems", context)?,
                })
            }
            "enum" => {
                let literals = obj["enum"]
                    .as_array()
                    .ok_or_else(|| SchemaError::Malformed {
                        context: context.to_string(),
                        reason: "enum must be an array".to_string(),
                    })?;
                if literals.is_empty() {
                    return Err(SchemaError::Malformed {
                        context: context.to_string(),
                        reason: "enum must list at least one value".to_string(),
                    });
                }
                Ok(Self::Enum {
                    values: literals.iter().map(ParamValue::from_json).collect(),
                })
            }
            "$ref" => {
                let reference =
                    obj["$ref"]
                        .as_str()
                        .ok_or_else(|| SchemaError::Malformed {
                            context: context.to_string(),
                            reason: "$ref must be a string".to_string(),
                        })?;
                Ok(Self::Ref {
                    reference: reference.to_string(),
                })
            }
            "allOf" => {
                let raw_branches =
                    obj["allOf"]
                        .as_array()
                        .ok_or_else(|| SchemaError::Malformed {
                            context: context.to_string(),
                            reason: "allOf must be an array".to_string(),
                        })?;
                let mut branches = Vec::with_capacity(raw_branches.len());
                for (i, branch) in raw_branches.iter().enumerate() {
                    let child_context = format!("{context}/allOf/{i}");
                    branches.push(SchemaNode::parse(branch, registry, &child_context)?);
                }
                Ok(Self::AllOf { branches })
            }
            other => Err(SchemaError::Malformed {
                context: context.to_string(),
                reason: format!("keyword {other} has no structural parse rule"),
            }),
        }
    }

    /// Short tag for logging and error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Object { .. } => "object",
            Self::Array { .. } => "array",
            Self::Enum { .. } => "enum",
            Self::Ref { .. } => "ref",
            Self::AllOf { .. } => "allOf",
            Self::Number { .. } => "number",
            Self::Integer { .. } => "integer",
            Self::String { .. } => "string",
            Self::Custom { .. } => "custom",
        }
    }
}

/// Compact single-line rendering of a raw node for error messages.
pub(crate) fn compact(raw: &Value) -> String {
    let rendered = raw.to_string();
    if rendered.chars().count() > 120 {
        let head: String = rendered.chars().take(120).collect();
        format!("{head}...")
    } else {
        rendered
    }
}

fn field_f64(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<Option<f64>, SchemaError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| SchemaError::Malformed {
            context: context.to_string(),
            reason: format!("{key} must be a number, got {v}"),
        }),
    }
}

fn field_usize(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<Option<usize>, SchemaError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| SchemaError::Malformed {
                context: context.to_string(),
                reason: format!("{key} must be a non-negative integer, got {v}"),
            }),
    }
}
