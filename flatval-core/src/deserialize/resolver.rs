//! Resolver
//!
//! Work-list implementation of memoized graph resolution.

use std::collections::HashMap;
use std::vec;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::DecodeError;
use crate::value::{property_key, Composite, Handle, Heap, Materialized, Value};
use crate::wire::{Item, NodeId, Pair, SerializedGraph, SerializedItem};

/// A composite whose children are still being resolved.
enum Frame {
    Array {
        handle: Handle,
        elements: vec::IntoIter<NodeId>,
    },
    Object {
        handle: Handle,
        pairs: vec::IntoIter<Pair>,
        entry: Option<Entry>,
    },
}

/// The object pair currently in flight.
struct Entry {
    value_id: NodeId,
    /// Set once the key node has been resolved.
    key: Option<Value>,
}

impl Frame {
    /// The next child id to resolve, or `None` once the composite is full.
    fn next_child(&mut self) -> Option<NodeId> {
        match self {
            Frame::Array { elements, .. } => elements.next(),
            Frame::Object { pairs, entry, .. } => {
                if let Some(Entry { value_id, key: Some(_) }) = entry {
                    return Some(value_id.clone());
                }
                let Pair { key, value } = pairs.next()?;
                *entry = Some(Entry {
                    value_id: value,
                    key: None,
                });
                Some(key)
            }
        }
    }

    /// The composite this frame is filling.
    fn value(&self) -> Value {
        match self {
            Frame::Array { handle, .. } => Value::Array(*handle),
            Frame::Object { handle, .. } => Value::Object(*handle),
        }
    }

    /// Store the child requested by the last `next_child` call.
    ///
    /// A child composite is only handed over once its own frame has been
    /// popped, i.e. once it is completely filled.
    fn accept(&mut self, child: Value, heap: &mut Heap) {
        match self {
            Frame::Array { handle, .. } => {
                if let Some(Composite::Array(elements)) = heap.get_mut(*handle) {
                    elements.push(child);
                }
            }
            Frame::Object { handle, entry, .. } => match entry.take() {
                Some(Entry { value_id, key: None }) => {
                    *entry = Some(Entry {
                        value_id,
                        key: Some(child),
                    });
                }
                Some(Entry { key: Some(key), .. }) => {
                    let name = property_key(heap, &key);
                    if let Some(Composite::Object(entries)) = heap.get_mut(*handle) {
                        if entries.contains_key(&name) {
                            debug!(key = %name, "duplicate object key, keeping last value");
                        }
                        entries.insert(name, child);
                    }
                }
                None => {}
            },
        }
    }
}

pub(super) struct Resolver {
    root: NodeId,
    /// Nodes not yet reached. Each node is taken out when first resolved.
    pending: IndexMap<NodeId, SerializedItem>,
    resolved: HashMap<NodeId, Value>,
    heap: Heap,
    stack: SmallVec<[Frame; 16]>,
}

impl Resolver {
    pub(super) fn new(graph: SerializedGraph) -> Self {
        let resolved = HashMap::with_capacity(graph.serialized.len());
        Self {
            root: graph.root,
            pending: graph.serialized,
            resolved,
            heap: Heap::new(),
            stack: SmallVec::new(),
        }
    }

    pub(super) fn run(mut self) -> Result<Materialized, DecodeError> {
        let root_id = std::mem::take(&mut self.root);
        let root = self.resolve(&root_id)?;

        while let Some(depth) = self.stack.len().checked_sub(1) {
            let Some(child_id) = self.stack[depth].next_child() else {
                if let Some(done) = self.stack.pop() {
                    if let Some(parent) = self.stack.last_mut() {
                        parent.accept(done.value(), &mut self.heap);
                    }
                }
                continue;
            };
            let child = self.resolve(&child_id)?;
            // A new composite pushed its own frame; it reaches the parent
            // when that frame pops.
            if self.stack.len() == depth + 1 {
                self.stack[depth].accept(child, &mut self.heap);
            }
        }

        Ok(Materialized::new(self.heap, root))
    }

    fn resolve(&mut self, id: &NodeId) -> Result<Value, DecodeError> {
        if let Some(value) = self.resolved.get(id) {
            return Ok(value.clone());
        }

        let Some(raw) = self.pending.swap_remove(id) else {
            return Err(DecodeError::UnknownReference { id: id.clone() });
        };

        let value = match raw.decode(id)? {
            Item::Null => Value::Null,
            Item::Undefined => Value::Undefined,
            Item::Boolean(b) => Value::Bool(b),
            Item::Number(n) => Value::Number(n),
            Item::String(s) => Value::String(s),
            Item::Array(elements) => {
                let handle = self.heap.alloc_array();
                self.stack.push(Frame::Array {
                    handle,
                    elements: elements.into_iter(),
                });
                Value::Array(handle)
            }
            Item::Object(pairs) => {
                let handle = self.heap.alloc_object();
                self.stack.push(Frame::Object {
                    handle,
                    pairs: pairs.into_iter(),
                    entry: None,
                });
                Value::Object(handle)
            }
        };

        trace!(id = %id, kind = %value.kind(), "resolved node");
        self.resolved.insert(id.clone(), value.clone());
        Ok(value)
    }
}
