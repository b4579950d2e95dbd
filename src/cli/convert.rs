//! JSON <-> sift Value conversion

use crate::{Key, Value};

/// Convert serde_json::Value to a sift record value
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => {
            Value::Object(obj.into_iter().map(|(k, v)| (k, json_to_value(v))).collect())
        }
    }
}

/// Convert a sift value to serde_json::Value.
///
/// JSON keys are strings, so numeric mapping keys are written in their
/// display form.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (key_to_string(k), value_to_json(v)))
                .collect(),
        ),
    }
}

fn key_to_string(key: Key) -> String {
    match key {
        Key::String(s) => s,
        other => other.to_string(),
    }
}
