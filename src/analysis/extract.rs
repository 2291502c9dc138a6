//! JSON extraction from free-form model output.
//!
//! Models wrap their verdict in prose or code fences more often than not,
//! so the verdict is located heuristically: everything from the first `{`
//! to the last `}` is parsed as one JSON document.
//!
//! Known limitation: this assumes the response holds at most one top-level
//! JSON object and no stray braces in the surrounding text. Two objects
//! (`{"a":1} {"b":2}`) produce a span that is not valid JSON and the
//! extraction fails.

use crate::error::ExtractionError;
use serde_json::{Map, Value};

/// Extract the JSON object embedded in `text`.
pub fn extract_json(text: &str) -> Result<Map<String, Value>, ExtractionError> {
    let start = text.find('{').ok_or(ExtractionError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(ExtractionError::NoJsonObject)?;
    if end < start {
        return Err(ExtractionError::NoJsonObject);
    }

    // Both indices sit on single-byte ASCII braces, so the slice is on char boundaries.
    let span = &text[start..=end];
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ExtractionError::NoJsonObject),
        Err(e) => Err(ExtractionError::InvalidJson(e.to_string())),
    }
}

/// Read a required string field.
pub fn required_str(map: &Map<String, Value>, field: &'static str) -> Result<String, ExtractionError> {
    map.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ExtractionError::MissingField(field))
}

/// Read a required numeric field.
pub fn required_f64(map: &Map<String, Value>, field: &'static str) -> Result<f64, ExtractionError> {
    map.get(field)
        .and_then(Value::as_f64)
        .ok_or(ExtractionError::MissingField(field))
}
