//! Python Conversion
//!
//! Materializes a value graph as Python objects. Every composite becomes
//! one `list` or `dict`, created up front and filled afterwards, so aliased
//! composites are the same Python object and cycles come out as real
//! cycles.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::value::{Composite, Materialized, Value};

/// Decode a JSON wire payload into Python objects.
#[pyfunction]
pub fn deserialize(py: Python<'_>, payload: &str) -> PyResult<PyObject> {
    let value = crate::decode_json(payload).map_err(|e| PyValueError::new_err(e.to_string()))?;
    to_python(py, &value)
}

/// Convert a materialized graph to Python objects.
pub fn to_python(py: Python<'_>, value: &Materialized) -> PyResult<PyObject> {
    let shells: Vec<PyObject> = value
        .heap()
        .iter()
        .map(|(_, composite)| match composite {
            Composite::Array(_) => PyList::empty_bound(py).into_any().unbind(),
            Composite::Object(_) => PyDict::new_bound(py).into_any().unbind(),
        })
        .collect();

    for (handle, composite) in value.heap().iter() {
        let shell = shells[handle.index()].bind(py);
        match composite {
            Composite::Array(elements) => {
                let list = shell.downcast::<PyList>()?;
                for element in elements {
                    list.append(convert(py, element, &shells))?;
                }
            }
            Composite::Object(entries) => {
                let dict = shell.downcast::<PyDict>()?;
                for (key, entry) in entries {
                    dict.set_item(key, convert(py, entry, &shells))?;
                }
            }
        }
    }

    Ok(convert(py, value.root(), &shells))
}

fn convert(py: Python<'_>, value: &Value, shells: &[PyObject]) -> PyObject {
    match value {
        Value::Null | Value::Undefined => py.None(),
        Value::Bool(b) => (*b).into_py(py),
        Value::Number(n) => (*n).into_py(py),
        Value::String(s) => s.as_str().into_py(py),
        Value::Array(handle) | Value::Object(handle) => shells[handle.index()].clone_ref(py),
    }
}
