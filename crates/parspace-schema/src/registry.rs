//! # Handler Registry
//!
//! The extension point for custom parameter kinds. A [`ShapeHandler`]
//! owns both halves of a schema shape's contract — how many scalars it
//! consumes and how it decodes them — and is registered against either a
//! structural keyword or a `type` name at construction time.
//!
//! The registry is an explicit, constructor-injected configuration value
//! owned by the [`Chooser`](crate::chooser::Chooser) instance. There is no
//! global handler state: two choosers with different registries coexist
//! without interference.
//!
//! Registering one of the built-in structural keywords (`properties`,
//! `items`, `enum`, `$ref`, `allOf`) or primitive types (`number`,
//! `integer`, `string`) overrides the built-in behavior; any other name
//! augments the set. Handlers receive the raw schema node and may recurse
//! through the chooser's `cardinality_raw` / `choose_raw` entry points
//! for nested shapes.

use std::sync::Arc;

use serde_json::Value;

use parspace_core::{ParamValue, Sample, SchemaError};

use crate::chooser::Chooser;
use crate::node::HandlerKey;

/// Decode contract for one schema shape.
///
/// Implementations must be pure with respect to the chooser and schema:
/// no handler may mutate shared state, so a chooser can serve many
/// concurrent decodes.
pub trait ShapeHandler: Send + Sync {
    /// Number of independent scalars one value of this shape consumes.
    fn cardinality(&self, chooser: &Chooser, raw: &Value) -> Result<usize, SchemaError>;

    /// Decode one value starting at `at`, returning the value and the
    /// next unused cursor position.
    fn choose(
        &self,
        chooser: &Chooser,
        raw: &Value,
        samples: &[Sample],
        at: usize,
    ) -> Result<(ParamValue, usize), SchemaError>;
}

/// Ordered registry of custom keyword and type handlers.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    keywords: Vec<(String, Arc<dyn ShapeHandler>)>,
    types: Vec<(String, Arc<dyn ShapeHandler>)>,
}

impl HandlerRegistry {
    /// An empty registry: built-in shapes only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a structural keyword.
    ///
    /// Re-registering a keyword replaces the earlier handler.
    pub fn with_keyword(mut self, keyword: impl Into<String>, handler: Arc<dyn ShapeHandler>) -> Self {
        let keyword = keyword.into();
        self.keywords.retain(|(k, _)| *k != keyword);
        self.keywords.push((keyword, handler));
        self
    }

    /// Register a handler for a `type` name.
    pub fn with_type(mut self, type_name: impl Into<String>, handler: Arc<dyn ShapeHandler>) -> Self {
        let type_name = type_name.into();
        self.types.retain(|(t, _)| *t != type_name);
        self.types.push((type_name, handler));
        self
    }

    /// Handler registered for a structural keyword, if any.
    pub fn keyword_handler(&self, keyword: &str) -> Option<&Arc<dyn ShapeHandler>> {
        self.keywords
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, h)| h)
    }

    /// Handler registered for a `type` name, if any.
    pub fn type_handler(&self, type_name: &str) -> Option<&Arc<dyn ShapeHandler>> {
        self.types
            .iter()
            .find(|(t, _)| t == type_name)
            .map(|(_, h)| h)
    }

    /// Registered keyword names, in registration order.
    pub fn keyword_names(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|(k, _)| k.as_str())
    }

    /// Handler backing a parsed [`HandlerKey`].
    ///
    /// Fails with [`SchemaError::UnrecognizedSchema`] if the registration
    /// the node was parsed against has no handler — which can only happen
    /// if a custom node outlives the registry it was parsed with.
    pub fn handler_for(&self, key: &HandlerKey) -> Result<&Arc<dyn ShapeHandler>, SchemaError> {
        let handler = match key {
            HandlerKey::Keyword(k) => self.keyword_handler(k),
            HandlerKey::Type(t) => self.type_handler(t),
        };
        handler.ok_or_else(|| SchemaError::UnrecognizedSchema {
            node: format!("no handler registered for {key}"),
        })
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field(
                "keywords",
                &self.keywords.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .field(
                "types",
                &self.types.iter().map(|(t, _)| t).collect::<Vec<_>>(),
            )
            .finish()
    }
}
