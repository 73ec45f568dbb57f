//! Attribute tree assembly
//!
//! The [`Assembler`] walks an [`AttributeSource`] depth first and rebuilds the
//! part of it a [`KeyFilter`] admits as a nested JSON object. A node's verdict
//! is taken before any of its children is read, so nothing below a rejected
//! node is ever accessed.

use crate::encoder::EncoderChain;
use crate::matcher::KeyFilter;
use crate::path::KeyPath;
use crate::source::{AttributeSource, Kind};
use serde_json::{Map, Value};

/// Default bound on the nesting depth walked below a root
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Builds filtered JSON documents from attribute sources
#[derive(Clone, Copy, Debug)]
pub struct Assembler<'c> {
    filter: &'c KeyFilter,
    encoders: &'c EncoderChain,
    max_depth: usize,
}

impl<'c> Assembler<'c> {
    /// Create an assembler over a configured filter and encoder chain
    pub fn new(filter: &'c KeyFilter, encoders: &'c EncoderChain) -> Self {
        Self {
            filter,
            encoders,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the depth guard.
    ///
    /// Containers nested deeper than this are not walked; they are rendered
    /// through the encoder chain instead.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Assemble the document for `root` bound to the top-level segment `name`.
    ///
    /// Returns `None` when the root itself is rejected by the filter.
    pub fn assemble(&self, name: &str, root: &dyn AttributeSource) -> Option<Value> {
        let path = KeyPath::root(name);
        if !self.filter.allows(&path) {
            return None;
        }
        Some(self.render(&path, root, 0))
    }

    fn render(&self, path: &KeyPath, value: &dyn AttributeSource, depth: usize) -> Value {
        match value.kind() {
            Kind::Scalar => value
                .scalar()
                .unwrap_or_else(|| self.encoders.render(value)),
            Kind::Mapping | Kind::Object if depth < self.max_depth => {
                Value::Object(self.children(path, value, depth))
            }
            // Elements share the path of their sequence
            Kind::Sequence if depth < self.max_depth => Value::Array(
                value
                    .items()
                    .iter()
                    .map(|item| self.render(path, &**item, depth + 1))
                    .collect(),
            ),
            Kind::Mapping | Kind::Object | Kind::Sequence => {
                tracing::trace!(
                    path = %path,
                    max_depth = self.max_depth,
                    "depth guard reached"
                );
                self.encoders.render(value)
            }
            Kind::Opaque => self.encoders.render(value),
        }
    }

    fn children(
        &self,
        path: &KeyPath,
        value: &dyn AttributeSource,
        depth: usize,
    ) -> Map<String, Value> {
        let mut out = Map::new();
        for key in value.keys() {
            let child_path = path.child(&key);
            if !self.filter.allows(&child_path) {
                continue;
            }
            match value.attribute(&key) {
                Ok(child) => {
                    let rendered = self.render(&child_path, &*child, depth + 1);
                    out.insert(key.into_owned(), rendered);
                }
                Err(err) => {
                    tracing::trace!(
                        path = %child_path,
                        error = %err,
                        "attribute skipped"
                    );
                }
            }
        }
        out
    }
}

/// Whether a value counts as empty: `null`, `""`, `[]` or `{}`
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Drop empty values at every level, bottom-up.
///
/// A container emptied by the pass is itself dropped from its parent. The
/// top-level value is never removed, only emptied.
pub fn remove_empty(value: &mut Value) {
    match value {
        Value::Object(map) => map.retain(|_, child| {
            remove_empty(child);
            !is_empty_value(child)
        }),
        Value::Array(items) => items.retain_mut(|child| {
            remove_empty(child);
            !is_empty_value(child)
        }),
        _ => {}
    }
}

/// Insert `value` under a dotted key, creating intermediate objects.
///
/// `insert_nested(map, "request.META.REQUEST_METHOD", v)` sets
/// `map["request"]["META"]["REQUEST_METHOD"] = v`. A non-object found where an
/// intermediate object is needed is replaced by one.
pub fn insert_nested(target: &mut Map<String, Value>, dotted: &str, value: Value) {
    match dotted.split_once('.') {
        None => {
            target.insert(dotted.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                insert_nested(inner, rest, value);
            }
        }
    }
}
