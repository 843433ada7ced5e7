//! Conversion between nested configuration trees and flat dot-path maps.

use serde_json::{Map, Value};

/// Flat mapping of dot-notation path to value, in insertion order.
pub type FlatPathMap = Map<String, Value>;

/// Normalize `[n]` index syntax to `.n` segments (`shadows[2]` -> `shadows.2`).
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '[' {
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }
            if !digits.is_empty() && chars.peek() == Some(&']') {
                chars.next();
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(&digits);
            } else {
                out.push('[');
                out.push_str(&digits);
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// Split a path into its segments, dropping empty ones.
pub fn split_path(path: &str) -> Vec<String> {
    normalize_path(path)
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join a parent path and a key.
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Whether `a` and `b` name the same node or one contains the other.
pub fn paths_overlap(a: &str, b: &str) -> bool {
    let a = normalize_path(a);
    let b = normalize_path(b);
    a == b || is_descendant(&a, &b) || is_descendant(&b, &a)
}

/// Whether `path` lies strictly below `ancestor`.
fn is_descendant(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'.'
}

/// Parse a segment as an array index.
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Whether a value is a leaf (neither object nor array).
#[inline]
pub fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Flatten a configuration tree into a dot-path map.
///
/// Arrays of primitives are stored whole; arrays holding any object or array
/// are expanded with numeric segments. `null` is kept as an explicit entry and
/// empty objects are kept as `{}` leaves. A non-object root yields an empty map.
pub fn flatten(tree: &Value) -> FlatPathMap {
    let mut out = FlatPathMap::new();
    if let Value::Object(map) = tree {
        for (key, value) in map {
            flatten_into(key, value, &mut out);
        }
    }
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut FlatPathMap) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(&join_path(prefix, key), child, out);
            }
        }
        Value::Array(items) if !items.iter().all(is_primitive) => {
            for (idx, child) in items.iter().enumerate() {
                flatten_into(&join_path(prefix, &idx.to_string()), child, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

/// Expand a dot-path map back into a nested tree.
///
/// Paths are applied in map order and always build objects; a path running
/// through an existing leaf replaces that leaf with a fresh object. Afterwards
/// every non-empty object whose keys are exactly `"0"..="n-1"` becomes an
/// array, which is how [`flatten`] writes arrays it expands.
pub fn expand(flat: &FlatPathMap) -> Value {
    let mut root = Value::Object(Map::new());
    for (path, value) in flat {
        set_at_path(&mut root, path, value.clone());
    }
    into_arrays(root)
}

/// Turn objects keyed by a dense index range into arrays, bottom-up.
fn into_arrays(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map.into_iter().map(|(k, v)| (k, into_arrays(v))).collect();
            let dense = !map.is_empty()
                && map
                    .keys()
                    .all(|k| parse_index(k).is_some_and(|i| i < map.len() && i.to_string() == *k));
            if !dense {
                return Value::Object(map);
            }
            let mut slots: Vec<(usize, Value)> = map
                .into_iter()
                .filter_map(|(k, v)| parse_index(&k).map(|i| (i, v)))
                .collect();
            slots.sort_by_key(|(i, _)| *i);
            Value::Array(slots.into_iter().map(|(_, v)| v).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(into_arrays).collect()),
        leaf => leaf,
    }
}

/// Look up the value at `path`.
pub fn get_at_path<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    split_path(path)
        .iter()
        .try_fold(tree, |node, segment| match node {
            Value::Object(map) => map.get(segment.as_str()),
            Value::Array(items) => parse_index(segment).and_then(|idx| items.get(idx)),
            _ => None,
        })
}

/// Assign `value` at `path`, creating intermediate objects as needed.
///
/// An empty path replaces the whole tree. See [`entry_at_path`] for how
/// existing arrays are addressed.
pub fn set_at_path(tree: &mut Value, path: &str, value: Value) {
    *entry_at_path(tree, path) = value;
}

/// Mutable slot at `path`, created as `null` when missing.
///
/// An index segment addresses an existing array element, or appends when it
/// equals the length. Any other segment turns the array into an object keyed
/// by its indexes, so no array is ever padded. Leaves on the way are replaced
/// by objects.
pub fn entry_at_path<'a>(tree: &'a mut Value, path: &str) -> &'a mut Value {
    split_path(path)
        .iter()
        .fold(tree, |node, segment| child_mut(node, segment))
}

/// Remove the value at `path`, returning it. Array elements are replaced by
/// `null` so sibling indexes stay stable.
pub fn remove_at_path(tree: &mut Value, path: &str) -> Option<Value> {
    let segments = split_path(path);
    let (last, parents) = segments.split_last()?;

    let parent = parents
        .iter()
        .try_fold(tree, |node, segment| match node {
            Value::Object(map) => map.get_mut(segment.as_str()),
            Value::Array(items) => parse_index(segment).and_then(move |idx| items.get_mut(idx)),
            _ => None,
        })?;

    match parent {
        Value::Object(map) => map.shift_remove(last.as_str()),
        Value::Array(items) => parse_index(last)
            .and_then(|idx| items.get_mut(idx))
            .map(|slot| std::mem::replace(slot, Value::Null)),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let slot = match node {
        Value::Array(items) => parse_index(segment).filter(|idx| *idx <= items.len()),
        _ => None,
    };
    if slot.is_none() && !node.is_object() {
        *node = match std::mem::take(node) {
            Value::Array(items) => Value::Object(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| (idx.to_string(), item))
                    .collect(),
            ),
            _ => Value::Object(Map::new()),
        };
    }

    match (node, slot) {
        (Value::Array(items), Some(idx)) => {
            if idx == items.len() {
                items.push(Value::Null);
            }
            &mut items[idx]
        }
        (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
        (other, _) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    // ==================== normalize_path tests ====================

    #[test]
    fn test_normalize_path_brackets() {
        assert_eq!(normalize_path("shadows[2]"), "shadows.2");
        assert_eq!(normalize_path("a[0][1].b"), "a.0.1.b");
    }

    #[test]
    fn test_normalize_path_leaves_non_index_brackets() {
        assert_eq!(normalize_path("a[b]"), "a[b]");
        assert_eq!(normalize_path("plain.path"), "plain.path");
    }

    #[test]
    fn test_paths_overlap() {
        assert!(paths_overlap("palette.primary", "palette.primary.main"));
        assert!(paths_overlap("palette.primary.main", "palette.primary"));
        assert!(paths_overlap("palette.primary", "palette.primary"));
        assert!(!paths_overlap("palette.primary", "palette.primaryDark"));
        assert!(!paths_overlap("palette.primary.main", "palette.secondary.main"));
    }

    // ==================== flatten tests ====================

    #[test]
    fn test_flatten_nested_objects() {
        let flat = flatten(&json!({
            "palette": { "primary": { "main": "#1976d2" } },
            "spacing": 8
        }));
        assert_eq!(flat.get("palette.primary.main"), Some(&json!("#1976d2")));
        assert_eq!(flat.get("spacing"), Some(&json!(8)));
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_flatten_primitive_array_stored_whole() {
        let flat = flatten(&json!({ "typography": { "fontFamily": ["Roboto", "Arial"] } }));
        assert_eq!(
            flat.get("typography.fontFamily"),
            Some(&json!(["Roboto", "Arial"]))
        );
    }

    #[test]
    fn test_flatten_object_array_expanded() {
        let flat = flatten(&json!({ "list": [1, { "a": true }] }));
        assert_eq!(flat.get("list.0"), Some(&json!(1)));
        assert_eq!(flat.get("list.1.a"), Some(&json!(true)));
    }

    #[test]
    fn test_flatten_keeps_null_and_empty_object() {
        let flat = flatten(&json!({ "a": null, "b": {} }));
        assert_eq!(flat.get("a"), Some(&Value::Null));
        assert_eq!(flat.get("b"), Some(&json!({})));
    }

    // ==================== expand tests ====================

    #[test]
    fn test_expand_bracket_paths() {
        let mut flat = FlatPathMap::new();
        flat.insert("shadows[0]".into(), json!("none"));
        flat.insert("shadows[1]".into(), json!("0 1px 2px #000"));
        assert_eq!(expand(&flat), json!({ "shadows": ["none", "0 1px 2px #000"] }));
    }

    #[test]
    fn test_expand_sparse_indexes_stay_object() {
        let mut flat = FlatPathMap::new();
        flat.insert("shadows[1]".into(), json!("none"));
        assert_eq!(expand(&flat), json!({ "shadows": { "1": "none" } }));
    }

    #[test]
    fn test_expand_numeric_keys_out_of_order() {
        let mut flat = FlatPathMap::new();
        flat.insert("list.1".into(), json!("b"));
        flat.insert("list.0".into(), json!("a"));
        assert_eq!(expand(&flat), json!({ "list": ["a", "b"] }));
    }

    #[test]
    fn test_round_trip_numeric_object_keys() {
        let tree = json!({ "palette": { "grey": { "50": "#fafafa", "100": "#f5f5f5", "A100": "#f5f5f5" } } });
        assert_eq!(expand(&flatten(&tree)), tree);

        let tree = json!({ "zIndex": { "1": "a", "2": "b" } });
        assert_eq!(expand(&flatten(&tree)), tree);
    }

    #[test]
    fn test_expand_huge_index_is_a_key() {
        let mut flat = FlatPathMap::new();
        flat.insert("shadows.18446744073709551615".into(), json!("x"));
        flat.insert("zIndex.100000000000".into(), json!(1));
        flat.insert("grey.99999999999999999999999".into(), json!(2));
        assert_eq!(
            expand(&flat),
            json!({
                "shadows": { "18446744073709551615": "x" },
                "zIndex": { "100000000000": 1 },
                "grey": { "99999999999999999999999": 2 }
            })
        );
    }

    #[test]
    fn test_expand_structural_conflict_last_write_wins() {
        let mut flat = FlatPathMap::new();
        flat.insert("spacing".into(), json!(8));
        flat.insert("spacing.unit".into(), json!(4));
        assert_eq!(expand(&flat), json!({ "spacing": { "unit": 4 } }));
    }

    #[test]
    fn test_round_trip() {
        let tree = json!({
            "palette": {
                "mode": "light",
                "primary": { "main": "#1976d2", "light": null },
                "tonalOffset": 0.2
            },
            "shadows": ["none", "0px 1px 3px rgba(0,0,0,0.2)"],
            "components": {
                "MuiButton": {
                    "defaultProps": {},
                    "variants": [
                        { "props": { "variant": "dashed" }, "style": { "border": "1px dashed" } },
                        { "props": {}, "style": { "tags": [] } }
                    ]
                }
            },
            "matrix": [[1, 2], [3]],
            "empty": []
        });
        assert_eq!(expand(&flatten(&tree)), tree);
    }

    #[test]
    fn test_round_trip_empty_tree() {
        let tree = json!({});
        assert_eq!(expand(&flatten(&tree)), tree);
    }

    // ==================== get/set tests ====================

    #[test]
    fn test_get_at_path() {
        let tree = json!({ "shadows": ["none", "x"], "palette": { "primary": { "main": "#fff" } } });
        assert_eq!(get_at_path(&tree, "palette.primary.main"), Some(&json!("#fff")));
        assert_eq!(get_at_path(&tree, "shadows[1]"), Some(&json!("x")));
        assert_eq!(get_at_path(&tree, "palette.secondary.main"), None);
        assert_eq!(get_at_path(&tree, "shadows.9"), None);
    }

    #[test]
    fn test_set_at_path_creates_intermediates() {
        let mut tree = json!({});
        set_at_path(&mut tree, "palette.primary.main", json!("#000"));
        set_at_path(&mut tree, "palette.primary.dark", json!("#111"));
        assert_eq!(
            tree,
            json!({ "palette": { "primary": { "main": "#000", "dark": "#111" } } })
        );
    }

    #[test]
    fn test_set_at_path_replaces_leaf_intermediate() {
        let mut tree = json!({ "shape": 4 });
        set_at_path(&mut tree, "shape.borderRadius", json!(12));
        assert_eq!(tree, json!({ "shape": { "borderRadius": 12 } }));
    }

    #[test]
    fn test_remove_at_path() {
        let mut tree = json!({ "a": { "b": 1, "c": 2 }, "list": [1, 2] });
        assert_eq!(remove_at_path(&mut tree, "a.b"), Some(json!(1)));
        assert_eq!(remove_at_path(&mut tree, "list.0"), Some(json!(1)));
        assert_eq!(remove_at_path(&mut tree, "a.missing"), None);
        assert_eq!(tree, json!({ "a": { "c": 2 }, "list": [null, 2] }));
    }

    #[test]
    fn test_set_at_path_array_element_and_append() {
        let mut tree = json!({ "shadows": ["none", "a", "b"] });
        set_at_path(&mut tree, "shadows.1", json!("z"));
        set_at_path(&mut tree, "shadows.3", json!("c"));
        assert_eq!(tree, json!({ "shadows": ["none", "z", "b", "c"] }));
    }

    #[test]
    fn test_set_at_path_far_index_converts_array() {
        let mut tree = json!({ "shadows": ["none"] });
        set_at_path(&mut tree, "shadows.18446744073709551615", json!("x"));
        assert_eq!(
            tree,
            json!({ "shadows": { "0": "none", "18446744073709551615": "x" } })
        );

        let mut tree = json!({ "list": [1, 2] });
        set_at_path(&mut tree, "list.first", json!(0));
        assert_eq!(tree, json!({ "list": { "0": 1, "1": 2, "first": 0 } }));
    }

    #[test]
    fn test_set_at_path_numeric_key_on_object() {
        let mut tree = json!({ "palette": { "grey": { "A100": "#f5f5f5" } } });
        set_at_path(&mut tree, "palette.grey.50", json!("#fafafa"));
        assert_eq!(
            tree,
            json!({ "palette": { "grey": { "A100": "#f5f5f5", "50": "#fafafa" } } })
        );
    }

    #[test]
    fn test_entry_at_path_creates_null_slot() {
        let mut tree = json!({});
        assert_eq!(entry_at_path(&mut tree, "a.b"), &mut Value::Null);
        assert_eq!(tree, json!({ "a": { "b": null } }));
    }

    #[test]
    fn test_set_at_path_object_with_index_key_kept() {
        let mut tree = json!({ "zIndex": {} });
        set_at_path(&mut tree, "zIndex.0.x", json!(1));
        assert_eq!(tree, json!({ "zIndex": { "0": { "x": 1 } } }));
    }
}
