//! Display-safe normalization of model-authored JSON.
//!
//! Every leaf becomes a string, arrays and objects keep their shape, and
//! objects that carry a rendering-library element marker collapse to text.

use serde_json::{Map, Value};

/// Field a rendering library stamps on its element objects.
pub const ELEMENT_MARKER: &str = "$$typeof";

/// Stand-in for elements whose children are not plain text.
pub const ELEMENT_PLACEHOLDER: &str = "[element]";

pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::String(s) => Value::String(s.clone()),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Object(map) if is_element(map) => Value::String(element_text(map)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), normalize(v)))
                .collect(),
        ),
    }
}

/// Normalizes in place, consuming the input.
pub fn normalize_owned(value: Value) -> Value {
    match value {
        Value::String(_) => value,
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_owned).collect()),
        Value::Object(map) if !is_element(&map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| (key, normalize_owned(v)))
                .collect(),
        ),
        other => normalize(&other),
    }
}

fn is_element(map: &Map<String, Value>) -> bool {
    map.contains_key(ELEMENT_MARKER)
}

fn element_text(map: &Map<String, Value>) -> String {
    match map.get("props").and_then(|props| props.get("children")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => ELEMENT_PLACEHOLDER.to_string(),
    }
}
