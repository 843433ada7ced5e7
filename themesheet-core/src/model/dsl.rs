//! Typed placeholders captured from code overrides.

use crate::path::{join_path, FlatPathMap};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Media query direction of a breakpoint helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakpointDirection {
    Up,
    Down,
    Between,
    Only,
}

impl BreakpointDirection {
    /// Parse the helper method name (`up`, `down`, `between`, `only`).
    pub fn from_method(name: &str) -> Option<Self> {
        match name {
            "up" => Some(BreakpointDirection::Up),
            "down" => Some(BreakpointDirection::Down),
            "between" => Some(BreakpointDirection::Between),
            "only" => Some(BreakpointDirection::Only),
            _ => None,
        }
    }
}

impl std::fmt::Display for BreakpointDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakpointDirection::Up => write!(f, "up"),
            BreakpointDirection::Down => write!(f, "down"),
            BreakpointDirection::Between => write!(f, "between"),
            BreakpointDirection::Only => write!(f, "only"),
        }
    }
}

/// Breakpoint argument: a named key (`md`) or a raw pixel width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BreakpointKey {
    Width(f64),
    Named(String),
}

impl std::fmt::Display for BreakpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakpointKey::Width(w) => write!(f, "{}", w),
            BreakpointKey::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A node of a compiled code override.
///
/// Containers and literals mirror the configuration tree; every other variant
/// is a placeholder resolved later against a resolution context. The tree
/// never holds executable code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$dsl", rename_all = "camelCase")]
pub enum DslNode {
    /// String, number, boolean or null.
    Literal { value: Value },
    Array { items: Vec<DslNode> },
    /// Object entries in source order.
    Object { entries: Vec<(String, DslNode)> },
    /// `theme.spacing(a, b, ...)`.
    Spacing { factors: Vec<f64> },
    /// `theme.palette.primary.main` and other theme reads.
    Token { path: String },
    /// `theme.breakpoints.up('md')` and friends.
    Breakpoint {
        key: BreakpointKey,
        direction: BreakpointDirection,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<BreakpointKey>,
    },
    /// Named color helper such as `alpha(color, 0.5)`.
    Helper { name: String, args: Vec<DslNode> },
    /// Style callback `({ theme }) => body`.
    Callback { params: Vec<String>, body: Box<DslNode> },
    /// Read of a style-callback props field such as `ownerState.size`.
    Prop { path: String },
    /// Object entry under a computed key, e.g. `[theme.breakpoints.down('md')]`.
    /// The parent object stores it under a placeholder label.
    Keyed { key: Box<DslNode>, value: Box<DslNode> },
}

impl Default for DslNode {
    fn default() -> Self {
        DslNode::empty_object()
    }
}

impl DslNode {
    /// An object with no entries.
    pub fn empty_object() -> Self {
        DslNode::Object {
            entries: Vec::new(),
        }
    }

    /// Literal node.
    pub fn literal(value: impl Into<Value>) -> Self {
        DslNode::Literal {
            value: value.into(),
        }
    }

    /// Whether this node is resolved later rather than copied as-is.
    pub fn is_placeholder(&self) -> bool {
        !matches!(
            self,
            DslNode::Literal { .. } | DslNode::Array { .. } | DslNode::Object { .. }
        )
    }

    /// Whether this is an object with no entries.
    pub fn is_empty_object(&self) -> bool {
        matches!(self, DslNode::Object { entries } if entries.is_empty())
    }

    /// Look up a direct object entry.
    pub fn entry(&self, key: &str) -> Option<&DslNode> {
        match self {
            DslNode::Object { entries } => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Structured stand-in for a placeholder, e.g. `{"$dsl": "spacing", "factors": [2]}`.
    pub fn placeholder_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Convert to a plain value, representing placeholders structurally.
    pub fn to_value(&self) -> Value {
        match self {
            DslNode::Literal { value } => value.clone(),
            DslNode::Array { items } => Value::Array(items.iter().map(DslNode::to_value).collect()),
            DslNode::Object { entries } => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect::<Map<String, Value>>(),
            ),
            placeholder => placeholder.placeholder_value(),
        }
    }

    /// Flatten into a dot-path map, keeping placeholders as structured leaves.
    ///
    /// Follows the same array rules as [`crate::path::flatten`].
    pub fn flatten(&self) -> FlatPathMap {
        let mut out = FlatPathMap::new();
        if let DslNode::Object { entries } = self {
            for (key, node) in entries {
                node.flatten_into(key, &mut out);
            }
        }
        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut FlatPathMap) {
        match self {
            DslNode::Object { entries } if !entries.is_empty() => {
                for (key, node) in entries {
                    node.flatten_into(&join_path(prefix, key), out);
                }
            }
            DslNode::Array { items } if !items.iter().all(|n| matches!(n, DslNode::Literal { .. })) => {
                for (idx, node) in items.iter().enumerate() {
                    node.flatten_into(&join_path(prefix, &idx.to_string()), out);
                }
            }
            other => {
                out.insert(prefix.to_string(), other.to_value());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(entries: Vec<(&str, DslNode)>) -> DslNode {
        DslNode::Object {
            entries: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    #[test]
    fn test_placeholder_value_is_tagged() {
        let node = DslNode::Spacing { factors: vec![2.0] };
        assert_eq!(node.placeholder_value(), json!({ "$dsl": "spacing", "factors": [2.0] }));
    }

    #[test]
    fn test_breakpoint_placeholder_omits_missing_end() {
        let node = DslNode::Breakpoint {
            key: BreakpointKey::Named("md".into()),
            direction: BreakpointDirection::Down,
            end: None,
        };
        assert_eq!(
            node.placeholder_value(),
            json!({ "$dsl": "breakpoint", "key": "md", "direction": "down" })
        );
    }

    #[test]
    fn test_flatten_keeps_placeholders_structured() {
        let tree = obj(vec![
            (
                "palette",
                obj(vec![("primary", obj(vec![("main", DslNode::literal("#00ff00"))]))]),
            ),
            ("spacing", DslNode::Spacing { factors: vec![1.0] }),
            ("shape", obj(vec![])),
        ]);
        let flat = tree.flatten();
        assert_eq!(flat.get("palette.primary.main"), Some(&json!("#00ff00")));
        assert_eq!(
            flat.get("spacing"),
            Some(&json!({ "$dsl": "spacing", "factors": [1.0] }))
        );
        assert_eq!(flat.get("shape"), Some(&json!({})));
    }

    #[test]
    fn test_flatten_array_with_placeholder_expands() {
        let tree = obj(vec![(
            "list",
            DslNode::Array {
                items: vec![DslNode::literal(1), DslNode::Token { path: "palette.mode".into() }],
            },
        )]);
        let flat = tree.flatten();
        assert_eq!(flat.get("list.0"), Some(&json!(1)));
        assert_eq!(
            flat.get("list.1"),
            Some(&json!({ "$dsl": "token", "path": "palette.mode" }))
        );
    }

    #[test]
    fn test_keyed_entry_is_a_structured_leaf() {
        let tree = obj(vec![(
            "root",
            obj(vec![(
                "@up(sm)",
                DslNode::Keyed {
                    key: Box::new(DslNode::Breakpoint {
                        key: BreakpointKey::Named("sm".into()),
                        direction: BreakpointDirection::Up,
                        end: None,
                    }),
                    value: Box::new(obj(vec![("padding", DslNode::literal(2))])),
                },
            )]),
        )]);
        let flat = tree.flatten();
        assert_eq!(
            flat.get("root.@up(sm)"),
            Some(&json!({
                "$dsl": "keyed",
                "key": { "$dsl": "breakpoint", "key": "sm", "direction": "up" },
                "value": { "$dsl": "object", "entries": [["padding", { "$dsl": "literal", "value": 2 }]] }
            }))
        );
    }

    #[test]
    fn test_serde_round_trip_callback() {
        let node = DslNode::Callback {
            params: vec!["theme".into()],
            body: Box::new(obj(vec![("padding", DslNode::Spacing { factors: vec![2.0] })])),
        };
        let json = serde_json::to_string(&node).unwrap();
        let back: DslNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
