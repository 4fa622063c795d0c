//! Serialized Graph
//!
//! The top-level wire document: a root id plus the node table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::item::{NodeId, SerializedItem};
use crate::error::DecodeError;
use crate::value::Materialized;

/// A flattened value graph as returned by the evaluator.
///
/// The table keeps wire order, which only matters for re-encoding; lookups
/// are by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedGraph {
    /// Id of the node the evaluation produced.
    pub root: NodeId,

    /// Every node reachable from the root, by id.
    pub serialized: IndexMap<NodeId, SerializedItem>,
}

impl SerializedGraph {
    /// Create an empty graph rooted at `root`.
    pub fn new(root: impl Into<NodeId>) -> Self {
        Self {
            root: root.into(),
            serialized: IndexMap::new(),
        }
    }

    /// Add a node, returning the node previously stored under `id`.
    pub fn insert(&mut self, id: impl Into<NodeId>, item: SerializedItem) -> Option<SerializedItem> {
        self.serialized.insert(id.into(), item)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, id: impl Into<NodeId>, item: SerializedItem) -> Self {
        self.insert(id, item);
        self
    }

    /// Look up a node.
    pub fn get(&self, id: &str) -> Option<&SerializedItem> {
        self.serialized.get(id)
    }

    /// Number of nodes in the table.
    pub fn len(&self) -> usize {
        self.serialized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serialized.is_empty()
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON document from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Parse a MessagePack document with map-encoded fields.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Encode as MessagePack, fields written by name.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(self)
    }

    /// Rebuild the value graph. Consumes the wire graph.
    pub fn deserialize(self) -> Result<Materialized, DecodeError> {
        crate::deserialize::deserialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::NodeKind;

    const PAYLOAD: &str = r#"{
        "root": "0",
        "serialized": {
            "0": { "type": "object", "value": [{ "key": "2", "value": "1" }] },
            "2": { "type": "string", "value": "name" },
            "1": { "type": "string", "value": "flatval" },
            "3": { "type": "null" }
        }
    }"#;

    #[test]
    fn parses_wire_document() {
        let graph = SerializedGraph::from_json(PAYLOAD).unwrap();
        assert_eq!(graph.root.as_str(), "0");
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get("3").unwrap().kind, NodeKind::Null.as_str());
        assert!(graph.get("3").unwrap().value.is_null());
    }

    #[test]
    fn preserves_table_order() {
        let graph = SerializedGraph::from_json(PAYLOAD).unwrap();
        let ids: Vec<_> = graph.serialized.keys().map(NodeId::as_str).collect();
        assert_eq!(ids, ["0", "2", "1", "3"]);
    }

    #[test]
    fn rejects_documents_without_root() {
        let err = SerializedGraph::from_json(r#"{ "serialized": {} }"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn reads_msgpack_documents() {
        let graph = SerializedGraph::new("a")
            .with("a", SerializedItem::array(["b"]))
            .with("b", SerializedItem::number(4.0));

        let bytes = graph.to_msgpack().unwrap();
        let decoded = SerializedGraph::from_msgpack(&bytes).unwrap();
        assert_eq!(decoded.root.as_str(), "a");
        assert_eq!(decoded.get("a").unwrap().kind, "array");
        assert_eq!(decoded.get("b").unwrap().value.as_f64(), Some(4.0));
    }

    #[test]
    fn rejects_truncated_msgpack() {
        let err = SerializedGraph::from_msgpack(&[0x82, 0xa4]).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMsgpack(_)));
    }
}
