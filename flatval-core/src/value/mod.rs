//! Materialized Values
//!
//! This module defines the live value graph produced by the deserializer.
//!
//! # Overview
//!
//! Scalars are stored inline in `Value`. Arrays and objects are stored in a
//! `Heap` and a `Value` only holds their `Handle`. This gives composites an
//! identity that can be shared:
//!
//! - two fields that alias the same array hold the same handle
//! - an array that contains itself holds its own handle
//!
//! Comparing two `Value`s with `==` therefore compares composites by
//! identity and scalars by value.

mod heap;
mod key;
mod render;

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

pub use heap::{Composite, Handle, Heap};
pub use key::{number_to_string, property_key};
pub use render::{MAX_DEPTH, VALUE_BUDGET};

use crate::wire::NodeKind;

/// Marker written in place of a back-reference to an enclosing composite.
pub const CIRCULAR: &str = "[Circular]";

/// A reconstructed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Handle),
    Object(Handle),
}

impl Value {
    /// The wire kind this value was decoded from.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Null => NodeKind::Null,
            Self::Undefined => NodeKind::Undefined,
            Self::Bool(_) => NodeKind::Boolean,
            Self::Number(_) => NodeKind::Number,
            Self::String(_) => NodeKind::String,
            Self::Array(_) => NodeKind::Array,
            Self::Object(_) => NodeKind::Object,
        }
    }

    /// The composite handle, if this is an array or object.
    pub fn handle(&self) -> Option<Handle> {
        match self {
            Self::Array(handle) | Self::Object(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.handle().is_some()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A fully reconstructed value graph, owned by the caller.
#[derive(Debug, Clone)]
pub struct Materialized {
    heap: Heap,
    root: Value,
}

impl Materialized {
    pub(crate) fn new(heap: Heap, root: Value) -> Self {
        Self { heap, root }
    }

    /// The value the evaluation produced.
    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn into_parts(self) -> (Heap, Value) {
        (self.heap, self.root)
    }

    /// Elements of an array value.
    pub fn array(&self, value: &Value) -> Option<&[Value]> {
        match value {
            Value::Array(handle) => self.heap.get(*handle).and_then(Composite::as_array),
            _ => None,
        }
    }

    /// Entries of an object value.
    pub fn object(&self, value: &Value) -> Option<&IndexMap<String, Value>> {
        match value {
            Value::Object(handle) => self.heap.get(*handle).and_then(Composite::as_object),
            _ => None,
        }
    }

    /// Whether both values are the same composite instance.
    ///
    /// Always `false` for scalars: they have no identity.
    pub fn same_instance(&self, a: &Value, b: &Value) -> bool {
        match (a.handle(), b.handle()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Number of distinct arrays and objects in the graph.
    pub fn composite_count(&self) -> usize {
        self.heap.len()
    }

    /// Convert to a JSON tree for display.
    ///
    /// `undefined` becomes `null`. A reference back to a composite that
    /// encloses it becomes the string `"[Circular]"`. Shared composites that
    /// do not form a cycle are expanded at every occurrence, within the
    /// `MAX_DEPTH` and `VALUE_BUDGET` limits.
    pub fn to_json(&self) -> JsonValue {
        render::to_json(&self.heap, &self.root)
    }
}

impl fmt::Display for Materialized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::write(f, &self.heap, &self.root)
    }
}
