//! Lenient readers for Alibaba Cloud response items.
//!
//! Every reader takes a JSON pointer into the raw item and falls back to the
//! type's zero value when the field is absent or of an unexpected shape.

use serde_json::{Map, Value};

/// String field. Numbers are rendered, anything else is `""`.
pub fn text(raw: &Value, pointer: &str) -> String {
    match raw.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub fn int(raw: &Value, pointer: &str) -> i64 {
    match raw.pointer(pointer) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub fn float(raw: &Value, pointer: &str) -> f64 {
    match raw.pointer(pointer) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn flag(raw: &Value, pointer: &str) -> bool {
    raw.pointer(pointer).and_then(Value::as_bool).unwrap_or(false)
}

/// Nested object, or `null` when absent.
pub fn object(raw: &Value, pointer: &str) -> Value {
    match raw.pointer(pointer) {
        Some(v @ Value::Object(_)) => v.clone(),
        _ => Value::Null,
    }
}

/// Array elements at `pointer`; empty when absent.
pub fn list<'a>(raw: &'a Value, pointer: &str) -> &'a [Value] {
    raw.pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// String elements of the array at `pointer`.
pub fn strings(raw: &Value, pointer: &str) -> Vec<String> {
    list(raw, pointer)
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Vendor tags rendered as `k=v;k=v`.
///
/// Accepts `{"Tag": [{"TagKey", "TagValue"}]}`, a bare tag array, or an
/// already rendered string.
pub fn tags(raw: &Value, pointer: &str) -> String {
    let entries = match raw.pointer(pointer) {
        Some(Value::String(s)) => return s.clone(),
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(obj @ Value::Object(_)) => list(obj, "/Tag"),
        _ => return String::new(),
    };
    entries
        .iter()
        .map(|tag| format!("{}={}", text(tag, "/TagKey"), text(tag, "/TagValue")))
        .collect::<Vec<_>>()
        .join(";")
}

/// Object built from `(name, value)` pairs, for `Extra` style detail.
pub fn detail<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
