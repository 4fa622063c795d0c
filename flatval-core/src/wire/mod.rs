//! Wire Format
//!
//! This module defines the flattened value graph returned by the remote
//! evaluator.
//!
//! # Overview
//!
//! The evaluator cannot send its result as a plain JSON tree because the
//! value may alias itself (two fields pointing at the same array) or
//! contain cycles (an object holding a reference to itself). Instead every
//! value is assigned a node identifier and the reply is a flat table:
//!
//! ```text
//! {
//!   "root": "0",
//!   "serialized": {
//!     "0": { "type": "array",  "value": ["1", "0"] },
//!     "1": { "type": "string", "value": "hello" }
//!   }
//! }
//! ```
//!
//! Composite nodes (`array`, `object`) refer to their children by id.
//! Object keys are nodes too, since the source graph may use keys that
//! are not strings.
//!
//! Items are kept in their raw form (`SerializedItem`) until the
//! deserializer reaches them. `SerializedItem::decode` turns a raw item
//! into the closed `Item` union, so a malformed node only fails the call
//! when it is actually reachable from the root.

mod graph;
mod item;

pub use graph::SerializedGraph;
pub use item::{Item, NodeId, NodeKind, Pair, SerializedItem};
