//! Composite Heap
//!
//! Arrays and objects live in an arena and are referred to by `Handle`.
//! A handle is the identity of a composite: two values holding the same
//! handle are the same instance, which is how aliasing and cycles survive
//! without reference counting.

use indexmap::IndexMap;

use super::Value;

/// Identity of a composite inside one `Heap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    /// Position of the composite in its heap.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An array or object body.
#[derive(Debug, Clone, PartialEq)]
pub enum Composite {
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Composite {
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(elements) => Some(elements.as_slice()),
            Self::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(entries) => Some(entries),
            Self::Array(_) => None,
        }
    }

    /// Number of elements or entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Array(elements) => elements.len(),
            Self::Object(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Arena owning every composite of one materialized graph.
#[derive(Debug, Clone, Default)]
pub struct Heap {
    slots: Vec<Composite>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an empty array.
    pub fn alloc_array(&mut self) -> Handle {
        self.alloc(Composite::Array(Vec::new()))
    }

    /// Allocate an empty object.
    pub fn alloc_object(&mut self) -> Handle {
        self.alloc(Composite::Object(IndexMap::new()))
    }

    fn alloc(&mut self, composite: Composite) -> Handle {
        let handle = Handle(self.slots.len());
        self.slots.push(composite);
        handle
    }

    /// Get a composite. `None` for handles from another heap.
    pub fn get(&self, handle: Handle) -> Option<&Composite> {
        self.slots.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Composite> {
        self.slots.get_mut(handle.0)
    }

    /// Iterate composites in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Composite)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, composite)| (Handle(index), composite))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
