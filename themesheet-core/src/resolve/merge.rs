//! Deep merge used by every layer stage.

use crate::path::{entry_at_path, FlatPathMap};
use serde_json::Value;

/// Merge `patch` onto `base` in place.
///
/// When both sides hold an object under the same key the objects are merged
/// recursively. Anything else (scalars, arrays, type changes) is replaced
/// wholesale by the patch value; arrays are never concatenated.
pub fn deep_merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                if let Some(existing) = base_map.get_mut(key) {
                    if existing.is_object() && patch_value.is_object() {
                        deep_merge(existing, patch_value);
                        continue;
                    }
                }
                base_map.insert(key.clone(), patch_value.clone());
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

/// Merge `patch` onto the node at `path`, creating it when missing.
pub fn merge_at_path(base: &mut Value, path: &str, patch: &Value) {
    deep_merge(entry_at_path(base, path), patch);
}

/// Merge every entry of a flat path map onto `base`, in map order.
///
/// Each edit lands on the existing node, so containers it does not name keep
/// their shape: an edit at `palette.grey.50` leaves `grey` an object and an
/// edit at `shadows.1` replaces one element of the array.
pub fn merge_flat(base: &mut Value, edits: &FlatPathMap) {
    for (path, value) in edits {
        merge_at_path(base, path, value);
    }
}

/// Merge `patch` onto a copy of `base`.
pub fn merged(base: &Value, patch: &Value) -> Value {
    let mut out = base.clone();
    deep_merge(&mut out, patch);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_merge_nested_objects() {
        let base = json!({ "palette": { "primary": { "main": "#111", "dark": "#000" } } });
        let patch = json!({ "palette": { "primary": { "main": "#222" }, "mode": "dark" } });
        assert_eq!(
            merged(&base, &patch),
            json!({ "palette": { "primary": { "main": "#222", "dark": "#000" }, "mode": "dark" } })
        );
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let base = json!({ "shadows": ["none", "a", "b"] });
        let patch = json!({ "shadows": ["none"] });
        assert_eq!(merged(&base, &patch), json!({ "shadows": ["none"] }));
    }

    #[test]
    fn test_merge_type_change_wins() {
        let base = json!({ "spacing": { "unit": 8 } });
        let patch = json!({ "spacing": 4 });
        assert_eq!(merged(&base, &patch), json!({ "spacing": 4 }));

        let back = merged(&json!({ "spacing": 4 }), &json!({ "spacing": { "unit": 2 } }));
        assert_eq!(back, json!({ "spacing": { "unit": 2 } }));
    }

    #[test]
    fn test_merge_empty_patch_is_identity() {
        let base = json!({ "a": 1, "b": [1, 2] });
        assert_eq!(merged(&base, &json!({})), base);
    }

    #[test]
    fn test_merge_null_overrides() {
        let base = json!({ "a": { "b": 1 } });
        assert_eq!(merged(&base, &json!({ "a": null })), json!({ "a": null }));
    }

    #[test]
    fn test_merge_flat_keeps_numeric_object_keys() {
        let mut base = json!({ "palette": { "grey": { "A100": "#f5f5f5" } } });
        let mut edits = FlatPathMap::new();
        edits.insert("palette.grey.50".into(), json!("#fafafa"));
        merge_flat(&mut base, &edits);
        assert_eq!(
            base,
            json!({ "palette": { "grey": { "A100": "#f5f5f5", "50": "#fafafa" } } })
        );
    }

    #[test]
    fn test_merge_flat_replaces_one_array_element() {
        let mut base = json!({ "shadows": ["none", "a", "b"] });
        let mut edits = FlatPathMap::new();
        edits.insert("shadows.1".into(), json!("z"));
        merge_flat(&mut base, &edits);
        assert_eq!(base, json!({ "shadows": ["none", "z", "b"] }));
    }

    #[test]
    fn test_merge_at_path_merges_objects() {
        let mut base = json!({ "shape": { "borderRadius": 4, "unit": "px" } });
        merge_at_path(&mut base, "shape", &json!({ "borderRadius": 8 }));
        assert_eq!(base, json!({ "shape": { "borderRadius": 8, "unit": "px" } }));
    }
}
