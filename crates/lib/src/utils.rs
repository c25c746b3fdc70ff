//! Small leaf helpers shared across the node engine.
//!
//! None of these depend on the node model except [`normalize_set`] and
//! [`dedupe`], which only need identity comparison.

use serde_json::Value;
use uuid::Uuid;

/// Generates a random identifier.
///
/// Used to name nodes created without a name and to label plugins in logs.
pub fn token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Collapses a sequence or set into an ordered list without duplicates.
///
/// The first occurrence of each item wins and keeps its position.
pub fn normalize_set<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Appends the entries of `incoming` to `existing`, skipping any already present.
pub fn dedupe<T: PartialEq>(mut existing: Vec<T>, incoming: impl IntoIterator<Item = T>) -> Vec<T> {
    for item in incoming {
        if !existing.contains(&item) {
            existing.push(item);
        }
    }
    existing
}

/// Looks up an own key of a JSON value.
///
/// Objects are checked by key. Arrays are checked by index, so a key of `"1"`
/// addresses the second element. Every other value has no own keys.
pub fn has_own<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Compares a JSON value against a search term by string form.
///
/// Strings compare directly, numbers compare numerically when the term parses
/// as one, and booleans compare against `"true"`/`"false"`. `null`, arrays and
/// objects never match.
pub fn loose_eq(value: &Value, term: &str) -> bool {
    match value {
        Value::String(s) => s == term,
        Value::Number(n) => match (n.as_f64(), term.trim().parse::<f64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => n.to_string() == term,
        },
        Value::Bool(b) => (if *b { "true" } else { "false" }) == term,
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}
