//! Dot-notation flattening of nested JSON structures.
//!
//! Pure recursion with no invariants of its own: [`flatten`] turns a
//! nested object/array tree into separator-joined leaf keys, and
//! [`unflatten`] rebuilds the tree. Arrays flatten under their numeric
//! indices and are rebuilt whenever a reconstructed object's keys are
//! exactly `0..n`.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// The default key separator.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Flattens a nested JSON tree into separator-joined key-value pairs.
///
/// Scalars are leaves; objects and arrays recurse. Empty containers
/// contribute no pairs and are therefore not recoverable by
/// [`unflatten`].
pub fn flatten(value: &Value, separator: &str) -> IndexMap<String, Value> {
    let mut result = IndexMap::new();
    flatten_into(value, "", separator, &mut result);
    result
}

fn flatten_into(value: &Value, prefix: &str, separator: &str, out: &mut IndexMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(child, &join_key(prefix, key, separator), separator, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let key = index.to_string();
                flatten_into(child, &join_key(prefix, &key, separator), separator, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

fn join_key(prefix: &str, key: &str, separator: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{separator}{key}")
    }
}

/// Rebuilds a nested JSON tree from separator-joined key-value pairs.
pub fn unflatten(flat: &IndexMap<String, Value>, separator: &str) -> Value {
    let mut root = Map::new();
    for (path, value) in flat {
        assign_by_path(&mut root, path, value.clone(), separator);
    }
    rebuild_arrays(Value::Object(root))
}

fn assign_by_path(root: &mut Map<String, Value>, path: &str, value: Value, separator: &str) {
    let mut segments = if separator.is_empty() {
        vec![path]
    } else {
        path.split(separator).collect::<Vec<_>>()
    };
    let last = segments.pop().expect("split yields at least one segment");

    let mut current = root;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot.as_object_mut().expect("slot was just made an object");
    }
    current.insert(last.to_string(), value);
}

/// Converts every object whose keys are exactly `0..n` back to an array.
fn rebuild_arrays(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let rebuilt: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, rebuild_arrays(v)))
                .collect();
            match sequential_indices(&rebuilt) {
                Some(len) => {
                    let mut items = vec![Value::Null; len];
                    for (key, value) in rebuilt {
                        let index: usize = key.parse().expect("key was checked numeric");
                        items[index] = value;
                    }
                    Value::Array(items)
                }
                None => Value::Object(rebuilt),
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(rebuild_arrays).collect()),
        leaf => leaf,
    }
}

/// Returns the length when the map's keys are exactly `0..len`.
fn sequential_indices(map: &Map<String, Value>) -> Option<usize> {
    if map.is_empty() {
        return None;
    }
    let mut seen = vec![false; map.len()];
    for key in map.keys() {
        if key.len() > 1 && key.starts_with('0') {
            return None;
        }
        let index: usize = key.parse().ok()?;
        if index >= map.len() || seen[index] {
            return None;
        }
        seen[index] = true;
    }
    Some(map.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn flat(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_flatten_simple() {
        let input = json!({ "a": 1, "b": 2 });
        assert_eq!(
            flatten(&input, DEFAULT_SEPARATOR),
            flat(&[("a", json!(1)), ("b", json!(2))])
        );
    }

    #[test]
    fn test_flatten_nested() {
        let input = json!({ "a": 1, "b": { "c": 2, "d": { "e": 3 } } });
        assert_eq!(
            flatten(&input, DEFAULT_SEPARATOR),
            flat(&[("a", json!(1)), ("b.c", json!(2)), ("b.d.e", json!(3))])
        );
    }

    #[test]
    fn test_flatten_arrays_use_indices() {
        let input = json!({ "graph": [{ "id": "a" }, { "id": "b" }] });
        assert_eq!(
            flatten(&input, DEFAULT_SEPARATOR),
            flat(&[("graph.0.id", json!("a")), ("graph.1.id", json!("b"))])
        );
    }

    #[test]
    fn test_custom_separator() {
        let input = json!({ "a": { "b": 1 } });
        assert_eq!(flatten(&input, "_"), flat(&[("a_b", json!(1))]));
        assert_eq!(unflatten(&flat(&[("a_b", json!(1))]), "_"), input);
    }

    #[test]
    fn test_unflatten_nested() {
        let input = flat(&[("a", json!(1)), ("b.c", json!(2)), ("b.d.e", json!(3))]);
        assert_eq!(
            unflatten(&input, DEFAULT_SEPARATOR),
            json!({ "a": 1, "b": { "c": 2, "d": { "e": 3 } } })
        );
    }

    #[test]
    fn test_unflatten_rebuilds_arrays() {
        let input = flat(&[("xs.0", json!("a")), ("xs.1", json!("b"))]);
        assert_eq!(
            unflatten(&input, DEFAULT_SEPARATOR),
            json!({ "xs": ["a", "b"] })
        );
        // a gap keeps the object form
        let gappy = flat(&[("xs.0", json!("a")), ("xs.2", json!("b"))]);
        assert_eq!(
            unflatten(&gappy, DEFAULT_SEPARATOR),
            json!({ "xs": { "0": "a", "2": "b" } })
        );
    }

    // Nested literal-only JSON with dot-free, non-numeric object keys.
    fn arb_tree() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z][a-z0-9]{0,7}", inner, 1..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_unflatten_inverts_flatten(tree in arb_tree()) {
            let root = json!({ "root": tree });
            for separator in [".", "/"] {
                let flat = flatten(&root, separator);
                prop_assert_eq!(unflatten(&flat, separator), root.clone());
            }
        }
    }
}
