//! Registry of named, toggleable partial configurations.

use crate::config::{ColorScheme, SELECTION_FORMAT_VERSION};
use crate::error::{Result, ThemeError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Enabled flag per composable id.
pub type ComposableToggles = BTreeMap<String, bool>;

/// Resolution function of a composable.
pub type ResolveFn = Box<dyn Fn(ColorScheme) -> std::result::Result<Value, String>>;

/// A registered composable.
pub struct ComposableDefinition {
    /// Unique id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Optional longer description.
    pub description: Option<String>,
    resolve: ResolveFn,
}

impl ComposableDefinition {
    /// Create a composable whose fragment depends on the color scheme.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        resolve: impl Fn(ColorScheme) -> std::result::Result<Value, String> + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            resolve: Box::new(resolve),
        }
    }

    /// Create a composable with the same fragment for every scheme.
    pub fn fixed(id: impl Into<String>, label: impl Into<String>, fragment: Value) -> Self {
        Self::new(id, label, move |_| Ok(fragment.clone()))
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for ComposableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposableDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered catalog of composables.
#[derive(Debug, Default)]
pub struct ComposableRegistry {
    definitions: Vec<ComposableDefinition>,
}

impl ComposableRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the stock composables.
    pub fn with_builtins() -> Self {
        Self {
            definitions: builtin_composables(),
        }
    }

    /// Register a composable. Ids must be unique.
    pub fn register(&mut self, definition: ComposableDefinition) -> Result<()> {
        if self.contains(&definition.id) {
            return Err(ThemeError::DuplicateComposable { id: definition.id });
        }
        self.definitions.push(definition);
        Ok(())
    }

    /// Look up a composable.
    pub fn get(&self, id: &str) -> Result<&ComposableDefinition> {
        self.definitions
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ThemeError::UnknownComposable { id: id.to_string() })
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.iter().any(|d| d.id == id)
    }

    /// Composables in registration order.
    pub fn list(&self) -> impl Iterator<Item = &ComposableDefinition> {
        self.definitions.iter()
    }

    /// Resolve a composable's fragment for `scheme`.
    pub fn resolve(&self, id: &str, scheme: ColorScheme) -> Result<Value> {
        let definition = self.get(id)?;
        let fragment = (definition.resolve)(scheme).map_err(|message| ThemeError::Composition {
            id: id.to_string(),
            message,
        })?;
        if !fragment.is_object() {
            return Err(ThemeError::Composition {
                id: id.to_string(),
                message: "fragment is not an object".to_string(),
            });
        }
        Ok(fragment)
    }

    /// Build an envelope holding the enabled composables only.
    pub fn export_selection(&self, toggles: &ComposableToggles) -> ComposableSelection {
        ComposableSelection {
            version: SELECTION_FORMAT_VERSION,
            composables: toggles
                .iter()
                .filter(|(_, enabled)| **enabled)
                .map(|(id, _)| (id.clone(), true))
                .collect(),
            metadata: None,
        }
    }

    /// Parse an envelope, dropping ids this registry does not know.
    pub fn import_selection(&self, json: &str) -> Result<SelectionImport> {
        let selection: ComposableSelection =
            serde_json::from_str(json).map_err(|e| ThemeError::InvalidSelection {
                message: e.to_string(),
            })?;

        if selection.version != SELECTION_FORMAT_VERSION {
            return Err(ThemeError::InvalidSelection {
                message: format!(
                    "unsupported version {} (expected {})",
                    selection.version, SELECTION_FORMAT_VERSION
                ),
            });
        }

        let mut toggles = ComposableToggles::new();
        let mut warnings = Vec::new();
        for (id, enabled) in selection.composables {
            if self.contains(&id) {
                toggles.insert(id, enabled);
            } else {
                tracing::warn!("Ignoring unknown composable '{}' in selection", id);
                warnings.push(format!("Unknown composable '{}' ignored", id));
            }
        }

        Ok(SelectionImport {
            toggles,
            metadata: selection.metadata,
            warnings,
        })
    }
}

/// Serialized composable selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposableSelection {
    pub version: u32,
    pub composables: ComposableToggles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Result of importing a selection envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionImport {
    pub toggles: ComposableToggles,
    pub metadata: Option<Value>,
    pub warnings: Vec<String>,
}

/// The stock composable catalog.
pub fn builtin_composables() -> Vec<ComposableDefinition> {
    vec![
        ComposableDefinition::fixed("dense-spacing", "Dense spacing", json!({ "spacing": 4 }))
            .with_description("Halves the spacing unit for information-dense layouts"),
        ComposableDefinition::fixed(
            "comfortable-spacing",
            "Comfortable spacing",
            json!({ "spacing": 10 }),
        ),
        ComposableDefinition::fixed("rounded", "Rounded", json!({ "shape": { "borderRadius": 12 } })),
        ComposableDefinition::fixed("square", "Square", json!({ "shape": { "borderRadius": 0 } })),
        ComposableDefinition::new("high-contrast", "High contrast", |scheme| {
            let (fg, bg) = match scheme {
                ColorScheme::Light => ("#000000", "#ffffff"),
                ColorScheme::Dark => ("#ffffff", "#000000"),
            };
            Ok(json!({
                "palette": {
                    "text": { "primary": fg, "secondary": fg },
                    "background": { "default": bg, "paper": bg },
                    "divider": fg
                }
            }))
        })
        .with_description("Maximizes text and divider contrast for the active scheme"),
        ComposableDefinition::fixed(
            "compact-typography",
            "Compact typography",
            json!({
                "typography": {
                    "fontSize": 13,
                    "h1": { "fontSize": "4rem" },
                    "h2": { "fontSize": "3rem" },
                    "h3": { "fontSize": "2.5rem" }
                }
            }),
        ),
        ComposableDefinition::fixed(
            "flat-buttons",
            "Flat buttons",
            json!({
                "components": {
                    "MuiButton": { "defaultProps": { "disableElevation": true } }
                }
            }),
        ),
    ]
}
