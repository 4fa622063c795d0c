//! Property Keys
//!
//! Object keys arrive as nodes, so a key may resolve to any value. Keys are
//! stringified the way the evaluator's language turns a value into a
//! property name:
//!
//! - strings are used as-is
//! - `null`, `undefined`, `true`, `false` become their names
//! - numbers use their canonical text (`1`, not `1.0`)
//! - arrays join their elements with `,`, with `null`/`undefined` elements
//!   and cyclic back-references contributing nothing
//! - objects become `[object Object]`

use super::heap::{Composite, Handle, Heap};
use super::Value;

const OBJECT_KEY: &str = "[object Object]";

/// Stringify a resolved key node.
pub fn property_key(heap: &Heap, key: &Value) -> String {
    match key {
        Value::Array(handle) => join_array(heap, *handle),
        other => scalar_text(other),
    }
}

/// Canonical text of a number.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n == f64::INFINITY {
        "Infinity".to_owned()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_owned()
    } else if n == 0.0 {
        // Covers -0 as well.
        "0".to_owned()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Undefined => "undefined".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(*n),
        Value::String(s) => s.clone(),
        Value::Object(_) => OBJECT_KEY.to_owned(),
        Value::Array(_) => String::new(),
    }
}

struct Joining {
    handle: Handle,
    next: usize,
    text: String,
}

enum Step {
    Descend(Handle),
    Append(String),
    Finish,
}

// Nested arrays are joined with an explicit stack so hostile key nesting
// cannot exhaust the call stack.
fn join_array(heap: &Heap, root: Handle) -> String {
    let mut stack = vec![Joining {
        handle: root,
        next: 0,
        text: String::new(),
    }];

    loop {
        let Some(top) = stack.last_mut() else {
            return String::new();
        };

        let elements = heap
            .get(top.handle)
            .and_then(Composite::as_array)
            .unwrap_or_default();

        let step = match elements.get(top.next) {
            None => Step::Finish,
            Some(element) => {
                if top.next > 0 {
                    top.text.push(',');
                }
                top.next += 1;
                match element {
                    Value::Null | Value::Undefined => Step::Append(String::new()),
                    Value::Array(handle) => Step::Descend(*handle),
                    other => Step::Append(scalar_text(other)),
                }
            }
        };

        match step {
            Step::Append(text) => top.text.push_str(&text),
            Step::Descend(handle) => {
                if !stack.iter().any(|frame| frame.handle == handle) {
                    stack.push(Joining {
                        handle,
                        next: 0,
                        text: String::new(),
                    });
                }
            }
            Step::Finish => {
                let Some(done) = stack.pop() else {
                    return String::new();
                };
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&done.text),
                    None => return done.text,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array_of(heap: &mut Heap, elements: Vec<Value>) -> Handle {
        let handle = heap.alloc_array();
        if let Some(Composite::Array(slot)) = heap.get_mut(handle) {
            *slot = elements;
        }
        handle
    }

    #[test]
    fn numbers_use_canonical_text() {
        assert_eq!(number_to_string(1.0), "1");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(-42.0), "-42");
        assert_eq!(number_to_string(2.5), "2.5");
        assert_eq!(number_to_string(0.1), "0.1");
        assert_eq!(number_to_string(1e20), "100000000000000000000");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn scalar_keys() {
        let heap = Heap::new();
        assert_eq!(property_key(&heap, &Value::String("k".into())), "k");
        assert_eq!(property_key(&heap, &Value::Number(3.0)), "3");
        assert_eq!(property_key(&heap, &Value::Bool(false)), "false");
        assert_eq!(property_key(&heap, &Value::Null), "null");
        assert_eq!(property_key(&heap, &Value::Undefined), "undefined");
    }

    #[test]
    fn object_keys_use_fixed_text() {
        let mut heap = Heap::new();
        let object = heap.alloc_object();
        assert_eq!(property_key(&heap, &Value::Object(object)), "[object Object]");
    }

    #[test]
    fn array_keys_join_elements() {
        let mut heap = Heap::new();
        let inner = array_of(&mut heap, vec![Value::Number(2.0), Value::Null]);
        let outer = array_of(
            &mut heap,
            vec![
                Value::Number(1.0),
                Value::Array(inner),
                Value::Undefined,
                Value::String("x".into()),
            ],
        );
        assert_eq!(property_key(&heap, &Value::Array(outer)), "1,2,,,x");

        let empty = heap.alloc_array();
        assert_eq!(property_key(&heap, &Value::Array(empty)), "");
    }

    #[test]
    fn cyclic_array_keys_terminate() {
        let mut heap = Heap::new();
        let a = heap.alloc_array();
        if let Some(Composite::Array(slot)) = heap.get_mut(a) {
            slot.push(Value::Number(1.0));
            slot.push(Value::Array(a));
        }
        assert_eq!(property_key(&heap, &Value::Array(a)), "1,");
    }
}
