//! Deterministic serialization of request parameters for the coalescing
//! fingerprint (spec §4.1: "param canonicalization must be deterministic —
//! sorted-key serialization — or duplicate requests will not coalesce").

use serde_json::Value;

/// Renders `value` with every object's keys sorted, recursively, so two
/// structurally-equal JSON values always produce the same string regardless
/// of field insertion order.
pub fn canonicalize(value: &Value) -> String {
    let sorted = sort_keys(value);
    sorted.to_string()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
