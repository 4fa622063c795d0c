//! Flatval Core
//!
//! This crate provides the client core of the Flatval evaluation console.
//! It implements:
//!
//! - The wire format of the flattened value graphs the evaluator returns
//! - A deserializer that rebuilds those graphs, preserving shared
//!   references and cycles
//! - The console boundary: per-tab sessions, the transport seam and the
//!   evaluate round-trip
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `wire`: Serialized graph and node types
//! - `deserialize`: Memoized, work-list based graph resolution
//! - `value`: Materialized values, the composite heap and key coercion
//! - `console`: Sessions, transport and the evaluation flow
//!
//! # Example
//!
//! ```rust
//! use flatval_core::decode_json;
//!
//! let payload = r#"{
//!     "root": "a",
//!     "serialized": {
//!         "a": { "type": "array", "value": ["b", "a"] },
//!         "b": { "type": "number", "value": 1 }
//!     }
//! }"#;
//!
//! let value = decode_json(payload).unwrap();
//! let elements = value.array(value.root()).unwrap();
//!
//! // The second element is the array itself.
//! assert!(value.same_instance(&elements[1], value.root()));
//! assert_eq!(value.to_string(), "[1, [Circular]]");
//! ```

pub mod console;
pub mod deserialize;
pub mod error;
pub mod value;
pub mod wire;

#[cfg(feature = "python")]
pub mod python;

pub use deserialize::{decode_json, decode_msgpack, deserialize};
pub use error::DecodeError;
pub use value::{Materialized, Value};
pub use wire::{NodeId, NodeKind, SerializedGraph, SerializedItem};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
/// It registers all Python-exposed types and functions.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(python::deserialize, m)?)?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
