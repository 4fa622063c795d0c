//! Graph Deserialization
//!
//! This module rebuilds a `Materialized` value from a `SerializedGraph`.
//!
//! # Algorithm
//!
//! Resolution is memoized by node id:
//!
//! 1. If the id was resolved before, reuse that value. For composites this
//!    is the same handle, so aliasing is preserved.
//! 2. Otherwise decode the node. Scalars are recorded and returned.
//! 3. Arrays and objects are allocated empty and recorded *before* any
//!    child is resolved. A child that refers back to its parent then finds
//!    the placeholder in step 1 instead of recursing forever.
//!
//! Children are resolved from an explicit stack of frames rather than by
//! recursion, so the depth of the input graph is bounded by heap memory
//! instead of the thread's stack. Frames are processed depth-first, which
//! visits nodes in the same order a recursive resolver would. A new child
//! composite is appended to (or inserted into) its parent only when its own
//! frame pops, the point where a recursive call would return. Both are
//! observable through array keys: a key array is stringified only once it
//! is filled, and an enclosing array used as a key from inside its own
//! subtree does not yet contain the element being built.

mod resolver;

use tracing::debug;

use crate::error::DecodeError;
use crate::value::Materialized;
use crate::wire::SerializedGraph;

use resolver::Resolver;

/// Rebuild the value graph described by `graph`.
///
/// Fails on the first unknown reference, unknown kind or malformed payload
/// reachable from the root. Unreachable nodes are never inspected.
pub fn deserialize(graph: SerializedGraph) -> Result<Materialized, DecodeError> {
    let root = graph.root.clone();
    let nodes = graph.len();
    debug!(root = %root, nodes, "deserializing value graph");

    let value = Resolver::new(graph).run()?;

    debug!(
        root = %root,
        composites = value.composite_count(),
        "value graph deserialized"
    );
    Ok(value)
}

/// Parse a JSON wire document and deserialize it.
pub fn decode_json(json: &str) -> Result<Materialized, DecodeError> {
    deserialize(SerializedGraph::from_json(json)?)
}

/// Parse a MessagePack wire document and deserialize it.
pub fn decode_msgpack(bytes: &[u8]) -> Result<Materialized, DecodeError> {
    deserialize(SerializedGraph::from_msgpack(bytes)?)
}
