// src/locator.rs
//
// Finds the pool collection inside an arbitrarily-shaped payload. Upstream
// responses range from a bare array to deeply wrapped framework state
// (Next.js page props, Apollo caches, numeric-keyed pseudo-arrays), so
// resolution is a fixed ladder of strategies, each tried only when the
// previous one came up empty.

use serde_json::Value;
use std::collections::HashSet;

use crate::pools::RawPool;

/// Wrapper keys checked before anything else (API envelope shapes).
const WRAPPER_KEYS: [&str; 3] = ["result", "data", "json"];

/// Known collection container keys, in priority order.
const CONTAINER_KEYS: [&str; 7] = [
    "pools", "data", "result", "items", "records", "nodes", "edges",
];

/// Framework wrapper keys (Next.js / CMS shapes), in priority order.
const PAGE_KEYS: [&str; 3] = ["props", "pageProps", "attributes"];

/// An array counts as a pool collection when its first element carries at
/// least one identity signal and one metric signal in its key names.
const IDENTITY_SIGNALS: [&str; 4] = ["pool", "pair", "name", "token"];
const METRIC_SIGNALS: [&str; 4] = ["tvl", "volume", "fee", "staked"];

/// Resolve an arbitrary parsed payload to a list of raw pool objects.
///
/// Pure; returns an empty list (not an error) when nothing pool-like is
/// found, which the trial runner treats as an endpoint failure.
pub fn normalize_pools(data: &Value) -> Vec<RawPool> {
    if let Value::Array(items) = data {
        return items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect();
    }

    let Some(obj) = data.as_object() else {
        return Vec::new();
    };

    for key in WRAPPER_KEYS {
        if let Some(inner) = obj.get(key) {
            if inner.is_object() || inner.is_array() {
                let found = normalize_pools(inner);
                if !found.is_empty() {
                    return found;
                }
            }
        }
    }

    // Objects masquerading as arrays ({"0": {...}, "1": {...}}), produced
    // by some serializers.
    if !obj.is_empty()
        && obj
            .keys()
            .all(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()))
    {
        for value in obj.values() {
            let found = normalize_pools(value);
            if !found.is_empty() {
                return found;
            }
        }
    }

    for key in CONTAINER_KEYS {
        if let Some(inner) = obj.get(key) {
            if inner.is_object() || inner.is_array() {
                let found = normalize_pools(inner);
                if !found.is_empty() {
                    return found;
                }
            }
        }
    }

    for key in PAGE_KEYS {
        if let Some(inner) = obj.get(key) {
            let found = normalize_pools(inner);
            if !found.is_empty() {
                return found;
            }
        }
    }

    let mut visited = HashSet::new();
    if let Some(items) = find_pools_in_value(data, &mut visited) {
        return items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect();
    }

    Vec::new()
}

/// Structural fallback: depth-first walk of the whole value graph looking
/// for the first array whose first element looks like a pool. The visited
/// set is keyed on value identity so shared or pathological subtrees are
/// entered at most once.
fn find_pools_in_value<'a>(
    value: &'a Value,
    visited: &mut HashSet<usize>,
) -> Option<&'a Vec<Value>> {
    match value {
        Value::Array(items) => {
            if !visited.insert(value as *const Value as usize) {
                return None;
            }
            if looks_like_pool_array(items) {
                return Some(items);
            }
            for item in items {
                if let Some(found) = find_pools_in_value(item, visited) {
                    return Some(found);
                }
            }
            None
        }
        Value::Object(obj) => {
            if !visited.insert(value as *const Value as usize) {
                return None;
            }
            for inner in obj.values() {
                if let Some(found) = find_pools_in_value(inner, visited) {
                    return Some(found);
                }
            }
            None
        }
        _ => None,
    }
}

fn looks_like_pool_array(items: &[Value]) -> bool {
    let Some(first) = items.first().and_then(|v| v.as_object()) else {
        return false;
    };
    let keys: Vec<String> = first.keys().map(|k| k.to_lowercase()).collect();
    let has_identity = keys
        .iter()
        .any(|k| IDENTITY_SIGNALS.iter().any(|sig| k.contains(sig)));
    let has_metric = keys
        .iter()
        .any(|k| METRIC_SIGNALS.iter().any(|sig| k.contains(sig)));
    has_identity && has_metric
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_filters_non_objects() {
        let data = json!([{"name": "TEL/eUSD", "tvl": 1}, 42, null, {"name": "TEL/USDC", "tvl": 2}]);
        let pools = normalize_pools(&data);
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0]["name"], "TEL/eUSD");
    }

    #[test]
    fn test_idempotent_on_normalized_output() {
        let data = json!([{"name": "TEL/eUSD", "tvl": 1}]);
        let once = normalize_pools(&data);
        let again = normalize_pools(&Value::Array(
            once.iter().cloned().map(Value::Object).collect(),
        ));
        assert_eq!(once, again);
    }

    #[test]
    fn test_wrapper_keys_in_order() {
        let data = json!({"result": {"data": [{"name": "TEL/eUSD", "tvl": 1}]}});
        assert_eq!(normalize_pools(&data).len(), 1);
    }

    #[test]
    fn test_numeric_keyed_object() {
        let data = json!({"0": {"pools": [{"name": "TEL/eUSD", "tvl": 1}]}, "1": {}});
        assert_eq!(normalize_pools(&data).len(), 1);
    }

    #[test]
    fn test_mixed_keys_not_treated_as_array() {
        // One non-numeric key; must fall through to other strategies.
        let data = json!({"0": [{"name": "TEL/eUSD", "tvl": 1}], "meta": "x"});
        // Structural fallback still finds the array.
        assert_eq!(normalize_pools(&data).len(), 1);
    }

    #[test]
    fn test_container_key_priority() {
        let data = json!({
            "items": [{"name": "loser", "tvl": 0}],
            "pools": [{"name": "winner", "tvl": 1}]
        });
        let pools = normalize_pools(&data);
        assert_eq!(pools[0]["name"], "winner");
    }

    #[test]
    fn test_next_data_page_props_path() {
        let data = json!({
            "props": {"pageProps": {"pools": [{"name": "TEL/eUSD", "tvlUsd": 1_000_000}]}}
        });
        let pools = normalize_pools(&data);
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0]["tvlUsd"], 1_000_000);
    }

    #[test]
    fn test_structural_fallback_requires_both_signals() {
        // Identity signal only: not a pool array.
        let data = json!({"x": {"y": [{"name": "a", "color": "red"}]}});
        assert!(normalize_pools(&data).is_empty());

        // Identity + metric signal: found.
        let data = json!({"x": {"y": [{"pairName": "TEL/eUSD", "volume24h": 5}]}});
        assert_eq!(normalize_pools(&data).len(), 1);
    }

    #[test]
    fn test_scalar_and_empty_inputs() {
        assert!(normalize_pools(&json!(null)).is_empty());
        assert!(normalize_pools(&json!(12)).is_empty());
        assert!(normalize_pools(&json!({})).is_empty());
        assert!(normalize_pools(&json!([])).is_empty());
    }
}
