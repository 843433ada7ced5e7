//! Property tests for the path codec and edit routing.
//!
//! Generated trees avoid two shapes the flat form cannot tell apart: objects
//! keyed exactly `"0"..="n-1"` (they read back as arrays) and keys containing
//! `.` (the path separator).

use proptest::prelude::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use themesheet_core::path::{get_at_path, is_scoped};
use themesheet_core::{expand, flatten, ColorScheme, EditStore, FlatPathMap};

fn is_dense(map: &BTreeMap<String, Value>) -> bool {
    !map.is_empty()
        && map
            .keys()
            .all(|k| k.parse::<usize>().is_ok_and(|i| i < map.len() && i.to_string() == *k))
}

fn to_object(map: BTreeMap<String, Value>) -> Value {
    Value::Object(map.into_iter().collect::<Map<String, Value>>())
}

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof!["[a-zA-Z][a-zA-Z0-9]{0,5}", "[0-9]{1,3}"]
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z#0-9 .]{0,8}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..5)
                .prop_filter("index-keyed objects read back as arrays", |m| !is_dense(m))
                .prop_map(to_object),
        ]
    })
}

/// Configuration tree: always an object at the root.
fn arb_tree() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(arb_key(), arb_value(), 0..6)
        .prop_filter("index-keyed objects read back as arrays", |m| !is_dense(m))
        .prop_map(to_object)
}

fn arb_tail() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_key(), 0..3)
}

fn arb_scoped_path() -> impl Strategy<Value = String> {
    (prop_oneof![Just("palette"), Just("shadows")], arb_tail())
        .prop_map(|(head, tail)| std::iter::once(head.to_string()).chain(tail).collect::<Vec<_>>().join("."))
}

fn arb_global_path() -> impl Strategy<Value = String> {
    ("[a-z][a-zA-Z]{0,7}", arb_tail())
        .prop_filter("scoped prefixes are generated separately", |(head, _)| {
            head != "palette" && head != "shadows"
        })
        .prop_map(|(head, tail)| std::iter::once(head).chain(tail).collect::<Vec<_>>().join("."))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_flatten_expand_round_trip(tree in arb_tree()) {
        prop_assert_eq!(expand(&flatten(&tree)), tree);
    }

    #[test]
    fn prop_expand_reads_back_every_path(
        paths in prop::collection::btree_map(("[a-z]{1,4}", "[0-9]{1,25}"), arb_leaf(), 1..6)
    ) {
        let flat: FlatPathMap = paths
            .iter()
            .map(|((head, index), value)| (format!("{}.{}", head, index), value.clone()))
            .collect();
        let tree = expand(&flat);
        for (path, value) in &flat {
            prop_assert_eq!(get_at_path(&tree, path), Some(value));
        }
    }

    #[test]
    fn prop_scoped_edits_route_to_active_scheme(path in arb_scoped_path(), value in arb_leaf()) {
        prop_assert!(is_scoped(&path));
        let mut store = EditStore::new();
        store.set_edit(&path, value.clone());
        prop_assert_eq!(store.scoped_edits(ColorScheme::Light).get(&path), Some(&value));
        prop_assert!(store.scoped_edits(ColorScheme::Dark).is_empty());
        prop_assert!(store.global_edits().is_empty());
    }

    #[test]
    fn prop_global_edits_ignore_scheme(path in arb_global_path(), value in arb_value()) {
        prop_assert!(!is_scoped(&path));
        let mut store = EditStore::new();
        store.set_active_scheme(ColorScheme::Dark);
        store.set_edit(&path, value.clone());
        prop_assert_eq!(store.global_edits().get(&path), Some(&value));
        prop_assert!(store.scoped_edits(ColorScheme::Light).is_empty());
        prop_assert!(store.scoped_edits(ColorScheme::Dark).is_empty());
    }

    #[test]
    fn prop_reset_restores_preview(
        path in prop_oneof![arb_scoped_path(), arb_global_path()],
        value in arb_value(),
    ) {
        let mut store = EditStore::new();
        let before = store.preview().unwrap().config;
        store.set_edit(&path, value);
        prop_assert!(store.reset_path(&path));
        prop_assert!(!store.read(&path).has_visual_edit);
        prop_assert_eq!(store.preview().unwrap().config, before);
    }
}
