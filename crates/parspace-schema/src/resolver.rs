//! # Reference Resolver
//!
//! Resolves `$ref` URIs against the root schema document. All reference
//! targets are located, parsed, and cycle-checked once, at construction
//! time; after that the resolver is an immutable lookup table shared by
//! every decode.
//!
//! Only fragment references into the root document are supported
//! (`#`, `#/definitions/point`, ...). A reference that does not resolve
//! fails with [`SchemaError::UnresolvedReference`]; a cycle in the
//! reference graph fails with [`SchemaError::ReferenceCycle`] — cardinality
//! over a cyclic schema would be unbounded, so this is checked up front
//! rather than discovered by stack overflow mid-decode.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use parspace_core::SchemaError;

use crate::node::SchemaNode;
use crate::registry::HandlerRegistry;

/// Immutable lookup from reference URI to its pre-parsed target node.
#[derive(Debug, Clone)]
pub struct Resolver {
    targets: BTreeMap<String, SchemaNode>,
}

impl Resolver {
    /// Locate, parse, and cycle-check every reference reachable from
    /// `root` against the raw `document`.
    pub fn build(
        document: &Value,
        root: &SchemaNode,
        registry: &HandlerRegistry,
    ) -> Result<Self, SchemaError> {
        let mut targets: BTreeMap<String, SchemaNode> = BTreeMap::new();

        // Worklist: a reference target may itself contain references.
        let mut pending: Vec<String> = Vec::new();
        collect_refs(root, &mut pending);

        while let Some(reference) = pending.pop() {
            if targets.contains_key(&reference) {
                continue;
            }
            let raw = lookup_fragment(document, &reference)?;
            let node = SchemaNode::parse(raw, registry, &reference)?;
            collect_refs(&node, &mut pending);
            targets.insert(reference, node);
        }

        // Cycle check over the reference graph: edge A -> B when the
        // target of A contains a reference to B. Nodes proven acyclic are
        // memoized so shared subgraphs (reference diamonds) are walked once.
        let mut acyclic = BTreeSet::new();
        for start in targets.keys() {
            let mut trail = BTreeSet::new();
            check_cycle(start, &targets, &mut trail, &mut acyclic)?;
        }

        tracing::debug!(references = targets.len(), "schema references resolved");
        Ok(Self { targets })
    }

    /// Resolve a reference to its parsed target node.
    pub fn resolve(&self, reference: &str) -> Result<&SchemaNode, SchemaError> {
        self.targets
            .get(reference)
            .ok_or_else(|| SchemaError::UnresolvedReference {
                reference: reference.to_string(),
            })
    }

    /// Number of distinct references known to this resolver.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the schema contains no references at all.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Depth-first search for cycles along reference edges.
fn check_cycle(
    reference: &str,
    targets: &BTreeMap<String, SchemaNode>,
    trail: &mut BTreeSet<String>,
    acyclic: &mut BTreeSet<String>,
) -> Result<(), SchemaError> {
    if acyclic.contains(reference) {
        return Ok(());
    }
    if !trail.insert(reference.to_string()) {
        return Err(SchemaError::ReferenceCycle {
            reference: reference.to_string(),
        });
    }
    if let Some(node) = targets.get(reference) {
        let mut nested = Vec::new();
        collect_refs(node, &mut nested);
        for next in nested {
            check_cycle(&next, targets, trail, acyclic)?;
        }
    }
    trail.remove(reference);
    acyclic.insert(reference.to_string());
    Ok(())
}

/// Collect every reference URI contained in a parsed node.
///
/// Custom nodes are scanned as raw JSON: the engine cannot know their
/// structure, but any `$ref` string inside them must still resolve.
fn collect_refs(node: &SchemaNode, out: &mut Vec<String>) {
    match node {
        SchemaNode::Ref { reference } => out.push(reference.clone()),
        SchemaNode::Object { properties } => {
            for child in properties.values() {
                collect_refs(child, out);
            }
        }
        SchemaNode::Array { items, .. } => collect_refs(items, out),
        SchemaNode::AllOf { branches } => {
            for branch in branches {
                collect_refs(branch, out);
            }
        }
        SchemaNode::Custom { raw, .. } => collect_raw_refs(raw, out),
        SchemaNode::Enum { .. }
        | SchemaNode::Number { .. }
        | SchemaNode::Integer { .. }
        | SchemaNode::String { .. } => {}
    }
}

fn collect_raw_refs(raw: &Value, out: &mut Vec<String>) {
    match raw {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "$ref" {
                    if let Some(reference) = value.as_str() {
                        out.push(reference.to_string());
                    }
                }
                collect_raw_refs(value, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_raw_refs(item, out);
            }
        }
        _ => {}
    }
}

/// Look up a fragment reference (`#`, `#/a/b`) in the root document.
///
/// Pointer segments unescape `~1` to `/` and `~0` to `~` per RFC 6901.
fn lookup_fragment<'a>(document: &'a Value, reference: &str) -> Result<&'a Value, SchemaError> {
    let unresolved = || SchemaError::UnresolvedReference {
        reference: reference.to_string(),
    };

    let pointer = reference.strip_prefix('#').ok_or_else(unresolved)?;
    if pointer.is_empty() {
        return Ok(document);
    }

    let mut current = document;
    for segment in pointer.strip_prefix('/').ok_or_else(unresolved)?.split('/') {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&segment).ok_or_else(unresolved)?,
            Value::Array(items) => {
                let index: usize = segment.parse().map_err(|_| unresolved())?;
                items.get(index).ok_or_else(unresolved)?
            }
            _ => return Err(unresolved()),
        };
    }
    Ok(current)
}
