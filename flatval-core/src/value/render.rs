//! Presentation
//!
//! `to_json` and `Display` share one walk over the heap. The walk keeps its
//! own stack of open composites instead of recursing, and the set of
//! composites on the current path lives in a `HashSet`, so a back-reference
//! is detected in constant time.
//!
//! Output is bounded. Composites nested deeper than `MAX_DEPTH` are shown as
//! `[Array]` or `[Object]`, and once `VALUE_BUDGET` values have been written
//! the rest of every open composite is summarized as `... N more`. A shared
//! but acyclic composite is still expanded at each occurrence, so the budget
//! is what keeps a heavily shared graph from exploding.

use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value as JsonValue};

use super::heap::{Composite, Handle, Heap};
use super::key::number_to_string;
use super::{Value, CIRCULAR};

/// Nesting below which composites are collapsed to a marker.
pub const MAX_DEPTH: usize = 256;

/// Values written before the remaining ones are elided.
pub const VALUE_BUDGET: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Array,
    Object,
}

impl Shape {
    fn collapsed(self) -> &'static str {
        match self {
            Self::Array => "[Array]",
            Self::Object => "[Object]",
        }
    }
}

#[derive(Debug)]
enum Event<'a> {
    Scalar(&'a Value),
    Open { shape: Shape, len: usize },
    Key(&'a str),
    Close(Shape),
    Circular,
    Collapsed(Shape),
    Elided(usize),
}

struct Level {
    handle: Handle,
    shape: Shape,
    next: usize,
    key_sent: bool,
}

/// Depth-first event stream over one value.
struct Walk<'a> {
    heap: &'a Heap,
    start: Option<&'a Value>,
    stack: Vec<Level>,
    on_path: HashSet<Handle>,
    budget: usize,
}

impl<'a> Walk<'a> {
    fn new(heap: &'a Heap, root: &'a Value) -> Self {
        Self {
            heap,
            start: Some(root),
            stack: Vec::new(),
            on_path: HashSet::new(),
            budget: VALUE_BUDGET,
        }
    }

    fn enter(&mut self, value: &'a Value) -> Event<'a> {
        self.budget = self.budget.saturating_sub(1);
        let (handle, shape) = match value {
            Value::Array(handle) => (*handle, Shape::Array),
            Value::Object(handle) => (*handle, Shape::Object),
            scalar => return Event::Scalar(scalar),
        };
        if self.on_path.contains(&handle) {
            return Event::Circular;
        }
        if self.stack.len() >= MAX_DEPTH {
            return Event::Collapsed(shape);
        }
        let len = self.heap.get(handle).map_or(0, Composite::len);
        self.on_path.insert(handle);
        self.stack.push(Level {
            handle,
            shape,
            next: 0,
            key_sent: false,
        });
        Event::Open { shape, len }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        if let Some(root) = self.start.take() {
            return Some(self.enter(root));
        }

        let heap = self.heap;
        let level = self.stack.last_mut()?;
        let composite = heap.get(level.handle);
        let len = composite.map_or(0, Composite::len);

        if level.next < len {
            if self.budget == 0 && !level.key_sent {
                let rest = len - level.next;
                level.next = len;
                return Some(Event::Elided(rest));
            }
            match composite {
                Some(Composite::Array(elements)) => {
                    if let Some(element) = elements.get(level.next) {
                        level.next += 1;
                        return Some(self.enter(element));
                    }
                }
                Some(Composite::Object(entries)) => {
                    if let Some((key, value)) = entries.get_index(level.next) {
                        if !level.key_sent {
                            level.key_sent = true;
                            return Some(Event::Key(key));
                        }
                        level.key_sent = false;
                        level.next += 1;
                        return Some(self.enter(value));
                    }
                }
                None => {}
            }
        }

        let done = self.stack.pop()?;
        self.on_path.remove(&done.handle);
        Some(Event::Close(done.shape))
    }
}

fn elided(rest: usize) -> String {
    format!("... {rest} more")
}

/// Write the console preview of `root`.
pub(super) fn write(f: &mut fmt::Formatter<'_>, heap: &Heap, root: &Value) -> fmt::Result {
    // (shape, length, items written)
    let mut open: Vec<(Shape, usize, usize)> = Vec::new();

    for event in Walk::new(heap, root) {
        // Object values follow their key; everything else in a composite
        // starts a new item.
        let starts_item = match event {
            Event::Close(_) => false,
            Event::Key(_) | Event::Elided(_) => true,
            _ => open.last().is_some_and(|level| level.0 == Shape::Array),
        };
        if starts_item {
            if let Some(level) = open.last_mut() {
                if level.2 > 0 {
                    f.write_str(", ")?;
                }
                level.2 += 1;
            }
        }

        match event {
            Event::Scalar(value) => write_scalar(f, value)?,
            Event::Open { shape, len } => {
                f.write_str(match (shape, len) {
                    (Shape::Array, _) => "[",
                    (Shape::Object, 0) => "{",
                    (Shape::Object, _) => "{ ",
                })?;
                open.push((shape, len, 0));
            }
            Event::Key(key) => {
                if is_identifier(key) {
                    f.write_str(key)?;
                } else {
                    write!(f, "{key:?}")?;
                }
                f.write_str(": ")?;
            }
            Event::Close(shape) => {
                let len = open.pop().map_or(0, |level| level.1);
                f.write_str(match (shape, len) {
                    (Shape::Array, _) => "]",
                    (Shape::Object, 0) => "}",
                    (Shape::Object, _) => " }",
                })?;
            }
            Event::Circular => f.write_str(CIRCULAR)?,
            Event::Collapsed(shape) => f.write_str(shape.collapsed())?,
            Event::Elided(rest) => f.write_str(&elided(rest))?,
        }
    }
    Ok(())
}

fn write_scalar(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Undefined => f.write_str("undefined"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) => f.write_str(&number_to_string(*n)),
        Value::String(s) => write!(f, "{s:?}"),
        Value::Array(_) | Value::Object(_) => Ok(()),
    }
}

enum Building {
    Array(Vec<JsonValue>),
    Object(Map<String, JsonValue>, Option<String>),
}

/// Build the JSON display tree of `root`.
pub(super) fn to_json(heap: &Heap, root: &Value) -> JsonValue {
    let mut open: Vec<Building> = Vec::new();
    let mut result = JsonValue::Null;

    for event in Walk::new(heap, root) {
        let value = match event {
            Event::Open { shape, len } => {
                open.push(match shape {
                    Shape::Array => Building::Array(Vec::with_capacity(len)),
                    Shape::Object => Building::Object(Map::new(), None),
                });
                continue;
            }
            Event::Key(key) => {
                if let Some(Building::Object(_, pending)) = open.last_mut() {
                    *pending = Some(key.to_owned());
                }
                continue;
            }
            Event::Elided(rest) => {
                let note = JsonValue::String(elided(rest));
                match open.last_mut() {
                    Some(Building::Array(items)) => items.push(note),
                    Some(Building::Object(entries, _)) => {
                        entries.insert("...".to_owned(), note);
                    }
                    None => {}
                }
                continue;
            }
            Event::Close(_) => match open.pop() {
                Some(Building::Array(items)) => JsonValue::Array(items),
                Some(Building::Object(entries, _)) => JsonValue::Object(entries),
                None => continue,
            },
            Event::Scalar(value) => scalar_json(value),
            Event::Circular => JsonValue::String(CIRCULAR.to_owned()),
            Event::Collapsed(shape) => JsonValue::String(shape.collapsed().to_owned()),
        };

        match open.last_mut() {
            Some(Building::Array(items)) => items.push(value),
            Some(Building::Object(entries, pending)) => {
                entries.insert(pending.take().unwrap_or_default(), value);
            }
            None => result = value,
        }
    }
    result
}

fn scalar_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Null | Value::Undefined | Value::Array(_) | Value::Object(_) => JsonValue::Null,
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
