//! Canonical document forms for drift detection
//!
//! Two structurally-equivalent documents (same keys and values, any key
//! order, any order in sortable lists) normalize to identical values, so
//! drift detection is plain equality on canonical forms.

use serde_json::Value;

/// Return a normalized copy of `value` suitable for exact comparison.
///
/// Mappings are keyed structures already ordered by key in `serde_json`;
/// their values are canonicalized recursively. Sequences are canonicalized
/// element-wise and then sorted by each element's serialized form; if any
/// element fails to serialize the sequence keeps its original order.
/// Scalars pass through unchanged.
///
/// Sorting sequences makes comparison order-insensitive, which is wrong for
/// order-sensitive lists such as command arguments. Known approximation,
/// kept for simplicity; see DESIGN.md.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), canonicalize(v)))
                .collect(),
        ),
        Value::Array(items) => {
            let items: Vec<Value> = items.iter().map(canonicalize).collect();
            let keys: Result<Vec<String>, _> =
                items.iter().map(serde_json::to_string).collect();
            match keys {
                Ok(keys) => {
                    let mut pairs: Vec<(String, Value)> =
                        keys.into_iter().zip(items).collect();
                    pairs.sort_by(|a, b| a.0.cmp(&b.0));
                    Value::Array(pairs.into_iter().map(|(_, v)| v).collect())
                }
                Err(_) => Value::Array(items),
            }
        }
        scalar => scalar.clone(),
    }
}

/// Structural equivalence on canonical forms.
pub fn equivalent(a: &Value, b: &Value) -> bool {
    canonicalize(a) == canonicalize(b)
}
