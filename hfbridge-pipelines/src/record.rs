//! Result-record extraction.
//!
//! Task invocations come back as lists of mapping objects with a fixed,
//! task-specific key vocabulary. Every field is checked for presence and
//! type at the boundary; a missing key or a wrong value type is a contract
//! violation naming the operation and key, never a silent coercion.

use hfbridge_core::{BridgeError, Result};
use pyo3::prelude::*;
use pyo3::types::PyList;

/// Interpret a runtime value as an ordered list of result records.
pub(crate) fn as_record_list<'py>(
    operation: &'static str,
    value: &Bound<'py, PyAny>,
) -> Result<Bound<'py, PyList>> {
    value.downcast::<PyList>().cloned().map_err(|_| {
        BridgeError::contract(
            operation,
            format!("expected a list of result records, got {}", type_name(value)),
        )
    })
}

/// Fetch a required record field. Works through the mapping protocol, so
/// both plain dicts and dict-like wrappers (tokenizer batch encodings)
/// are accepted.
pub(crate) fn require<'py>(
    operation: &'static str,
    record: &Bound<'py, PyAny>,
    key: &'static str,
) -> Result<Bound<'py, PyAny>> {
    record
        .get_item(key)
        .map_err(|_| BridgeError::contract(operation, format!("missing record key '{key}'")))
}

pub(crate) fn require_str(
    operation: &'static str,
    record: &Bound<'_, PyAny>,
    key: &'static str,
) -> Result<String> {
    require(operation, record, key)?.extract().map_err(|_| {
        BridgeError::contract(operation, format!("record key '{key}' is not a string"))
    })
}

pub(crate) fn require_f64(
    operation: &'static str,
    record: &Bound<'_, PyAny>,
    key: &'static str,
) -> Result<f64> {
    require(operation, record, key)?.extract().map_err(|_| {
        BridgeError::contract(operation, format!("record key '{key}' is not a number"))
    })
}

pub(crate) fn require_i64(
    operation: &'static str,
    record: &Bound<'_, PyAny>,
    key: &'static str,
) -> Result<i64> {
    require(operation, record, key)?.extract().map_err(|_| {
        BridgeError::contract(operation, format!("record key '{key}' is not an integer"))
    })
}

fn type_name(value: &Bound<'_, PyAny>) -> String {
    value
        .get_type()
        .name()
        .map(|n| n.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string())
}
