//! Wire Items
//!
//! A single node of the flattened graph, in raw and decoded form.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::DecodeError;

/// Identifier of a node within one wire payload.
///
/// Identifiers are opaque and carry no meaning across payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The closed set of node kinds the evaluator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Undefined,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl NodeKind {
    /// Look up a kind by its wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "null" => Some(Self::Null),
            "undefined" => Some(Self::Undefined),
            "boolean" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    /// The wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether values of this kind have identity.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{ "key": .., "value": .. }` entry of an object node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub key: NodeId,
    pub value: NodeId,
}

/// A node exactly as it appears on the wire.
///
/// The tag is kept as a string so an unrecognized tag can be reported
/// against the node that carries it instead of failing the whole parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedItem {
    /// The `type` tag.
    #[serde(rename = "type")]
    pub kind: String,

    /// Kind-specific payload. Absent for `null` and `undefined`.
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub value: JsonValue,
}

/// A decoded node.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Null,
    Undefined,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Element ids, in order.
    Array(Vec<NodeId>),
    /// Key/value id pairs, in order.
    Object(Vec<Pair>),
}

impl SerializedItem {
    fn tagged(kind: NodeKind, value: JsonValue) -> Self {
        Self {
            kind: kind.as_str().to_owned(),
            value,
        }
    }

    pub fn null() -> Self {
        Self::tagged(NodeKind::Null, JsonValue::Null)
    }

    pub fn undefined() -> Self {
        Self::tagged(NodeKind::Undefined, JsonValue::Null)
    }

    pub fn boolean(value: bool) -> Self {
        Self::tagged(NodeKind::Boolean, JsonValue::Bool(value))
    }

    /// A number node. Non-finite values are written the way the evaluator
    /// writes them, as the strings `NaN`, `Infinity` and `-Infinity`.
    pub fn number(value: f64) -> Self {
        let payload = match serde_json::Number::from_f64(value) {
            Some(n) => JsonValue::Number(n),
            None if value.is_nan() => JsonValue::from("NaN"),
            None if value > 0.0 => JsonValue::from("Infinity"),
            None => JsonValue::from("-Infinity"),
        };
        Self::tagged(NodeKind::Number, payload)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::tagged(NodeKind::String, JsonValue::String(value.into()))
    }

    pub fn array<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = elements
            .into_iter()
            .map(|id| JsonValue::String(id.into()))
            .collect();
        Self::tagged(NodeKind::Array, JsonValue::Array(ids))
    }

    pub fn object<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| serde_json::json!({ "key": key.into(), "value": value.into() }))
            .collect();
        Self::tagged(NodeKind::Object, JsonValue::Array(entries))
    }

    /// Decode the raw item into an `Item`.
    ///
    /// `id` is only used to label errors.
    pub fn decode(self, id: &NodeId) -> Result<Item, DecodeError> {
        let Some(kind) = NodeKind::from_tag(&self.kind) else {
            return Err(DecodeError::UnknownKind {
                id: id.clone(),
                kind: self.kind,
            });
        };

        let invalid = |reason: String| DecodeError::InvalidPayload {
            id: id.clone(),
            kind,
            reason,
        };

        match kind {
            NodeKind::Null => Ok(Item::Null),
            NodeKind::Undefined => Ok(Item::Undefined),
            NodeKind::Boolean => match self.value {
                JsonValue::Bool(b) => Ok(Item::Boolean(b)),
                other => Err(invalid(format!("expected a boolean, found {}", describe(&other)))),
            },
            NodeKind::Number => decode_number(self.value).map(Item::Number).map_err(invalid),
            NodeKind::String => match self.value {
                JsonValue::String(s) => Ok(Item::String(s)),
                other => Err(invalid(format!("expected a string, found {}", describe(&other)))),
            },
            NodeKind::Array => serde_json::from_value(self.value)
                .map(Item::Array)
                .map_err(|e| invalid(e.to_string())),
            NodeKind::Object => serde_json::from_value(self.value)
                .map(Item::Object)
                .map_err(|e| invalid(e.to_string())),
        }
    }
}

// JSON has no NaN or Infinity. The evaluator either writes them by name or
// lets its JSON encoder turn them into `null`, which can only mean NaN here.
fn decode_number(value: JsonValue) -> Result<f64, String> {
    match value {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("number {n} is not representable as f64")),
        JsonValue::Null => Ok(f64::NAN),
        JsonValue::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(format!("expected a number, found string {s:?}")),
        },
        other => Err(format!("expected a number, found {}", describe(&other))),
    }
}

fn describe(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "nothing",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "a map",
    }
}
