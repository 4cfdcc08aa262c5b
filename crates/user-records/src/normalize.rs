//! Whitespace normalization for inbound JSON bodies.
//!
//! Every string, at any depth, has runs of whitespace collapsed to a single
//! space and is trimmed. Non-string values are left alone.

use serde_json::Value;

pub fn normalize_input(value: &mut Value) {
    match value {
        Value::String(s) => *s = collapse_whitespace(s),
        Value::Array(items) => items.iter_mut().for_each(normalize_input),
        Value::Object(fields) => fields.values_mut().for_each(normalize_input),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
