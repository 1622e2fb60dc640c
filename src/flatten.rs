// src/flatten.rs
//
// Flattens a raw pool object into searchable (path, value) records. Paths
// are lowercased so keyword matching is case-insensitive; numeric-looking
// strings ("$1,234.56", "24h") additionally emit a parsed numeric entry at
// the same path.

use serde_json::Value;
use std::collections::HashSet;

use crate::pools::{FlatEntry, FlatPool, RawPool};

/// Traversal depth cap. Upstream pool objects are shallow; anything deeper
/// is framework state or a malformed blob and is not worth walking.
const MAX_DEPTH: usize = 32;

/// Flatten one raw pool. Pure and cycle-safe: containers are entered at
/// most once per traversal (identity-keyed visited set).
pub fn flatten_pool(pool: &RawPool) -> FlatPool {
    let mut flat = FlatPool::default();
    let mut visited: HashSet<usize> = HashSet::new();
    for (key, value) in pool {
        walk(value, &key.to_lowercase(), 1, &mut visited, &mut flat);
    }
    flat
}

fn walk(
    value: &Value,
    path: &str,
    depth: usize,
    visited: &mut HashSet<usize>,
    flat: &mut FlatPool,
) {
    if depth > MAX_DEPTH {
        return;
    }
    match value {
        Value::Null | Value::Bool(_) => {}
        Value::Number(num) => {
            if let Some(v) = num.as_f64().filter(|v| v.is_finite()) {
                flat.numbers.push(FlatEntry::new(path, v));
            }
        }
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return;
            }
            flat.strings.push(FlatEntry::new(path, trimmed.to_string()));
            if let Some(v) = parse_loose_number(trimmed) {
                flat.numbers.push(FlatEntry::new(path, v));
            }
        }
        Value::Array(items) => {
            if !visited.insert(value as *const Value as usize) {
                return;
            }
            for (i, item) in items.iter().enumerate() {
                walk(item, &format!("{path}[{i}]"), depth + 1, visited, flat);
            }
        }
        Value::Object(obj) => {
            if !visited.insert(value as *const Value as usize) {
                return;
            }
            for (key, inner) in obj {
                let child = if path.is_empty() {
                    key.to_lowercase()
                } else {
                    format!("{path}.{}", key.to_lowercase())
                };
                walk(inner, &child, depth + 1, visited, flat);
            }
        }
    }
}

/// Parse a formatted numeric string. Requires at least one digit, then
/// strips everything except digits, exponent markers, sign and the decimal
/// point before parsing.
fn parse_loose_number(s: &str) -> Option<f64> {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool(value: serde_json::Value) -> RawPool {
        value.as_object().cloned().expect("fixture must be an object")
    }

    #[test]
    fn test_paths_lowercased_and_joined() {
        let flat = flatten_pool(&pool(json!({
            "tvlUsd": 100.5,
            "stats": {"volume24H": 7, "tags": ["a", "b"]}
        })));
        let paths: Vec<&str> = flat.numbers.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["tvlusd", "stats.volume24h"]);
        let spaths: Vec<&str> = flat.strings.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(spaths, vec!["stats.tags[0]", "stats.tags[1]"]);
    }

    #[test]
    fn test_numeric_string_emits_both_entries() {
        let flat = flatten_pool(&pool(json!({"tvl": "$1,234.56"})));
        assert_eq!(flat.strings.len(), 1);
        assert_eq!(flat.strings[0].value, "$1,234.56");
        assert_eq!(flat.numbers.len(), 1);
        assert_eq!(flat.numbers[0].path, "tvl");
        assert!((flat.numbers[0].value - 1234.56).abs() < 1e-9);
    }

    #[test]
    fn test_non_numeric_string_is_string_only() {
        let flat = flatten_pool(&pool(json!({"name": "TEL/eUSD"})));
        assert_eq!(flat.strings.len(), 1);
        assert!(flat.numbers.is_empty());
    }

    #[test]
    fn test_null_bool_and_empty_string_skipped() {
        let flat = flatten_pool(&pool(json!({"a": null, "b": true, "c": "   "})));
        assert!(flat.numbers.is_empty());
        assert!(flat.strings.is_empty());
    }

    #[test]
    fn test_deep_nesting_terminates() {
        // Build a chain deeper than the cap; traversal must stop quietly.
        let mut value = json!({"tvl": 1});
        for _ in 0..(MAX_DEPTH + 8) {
            value = json!({ "wrap": value });
        }
        let flat = flatten_pool(&pool(value));
        assert!(flat.numbers.is_empty());
        assert!(flat.strings.is_empty());
    }

    #[test]
    fn test_repeated_shapes_each_flattened() {
        // Two structurally identical (but distinct) subtrees both appear;
        // the identity guard only blocks re-entry of the same allocation.
        let flat = flatten_pool(&pool(json!({
            "a": {"tvl": 1},
            "b": {"tvl": 1}
        })));
        assert_eq!(flat.numbers.len(), 2);
        assert_eq!(flat.numbers[0].path, "a.tvl");
        assert_eq!(flat.numbers[1].path, "b.tvl");
    }

    #[test]
    fn test_parse_loose_number() {
        assert_eq!(parse_loose_number("$1,234.56"), Some(1234.56));
        assert_eq!(parse_loose_number("1.5e3"), Some(1500.0));
        assert_eq!(parse_loose_number("-5.2%"), Some(-5.2));
        assert_eq!(parse_loose_number("TEL/eUSD"), None);
        assert_eq!(parse_loose_number("n/a"), None);
        // Stray exponent markers from unit suffixes poison the parse;
        // the entry is then string-only.
        assert_eq!(parse_loose_number("1500 TEL"), None);
    }
}
