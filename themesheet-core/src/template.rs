//! Base templates the layer stack starts from.

use crate::config::ColorScheme;
use crate::error::{Result, ThemeError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Id of the built-in default template.
pub const DEFAULT_TEMPLATE_ID: &str = "default";

/// Where a template comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Builtin,
    Imported,
}

/// Reference to a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateRef {
    pub kind: TemplateKind,
    pub id: String,
}

impl TemplateRef {
    /// Reference a built-in template.
    pub fn builtin(id: impl Into<String>) -> Self {
        Self {
            kind: TemplateKind::Builtin,
            id: id.into(),
        }
    }

    /// Reference an imported template.
    pub fn imported(id: impl Into<String>) -> Self {
        Self {
            kind: TemplateKind::Imported,
            id: id.into(),
        }
    }
}

impl Default for TemplateRef {
    fn default() -> Self {
        Self::builtin(DEFAULT_TEMPLATE_ID)
    }
}

impl std::fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TemplateKind::Builtin => write!(f, "builtin:{}", self.id),
            TemplateKind::Imported => write!(f, "imported:{}", self.id),
        }
    }
}

/// Source of complete base configurations.
pub trait TemplateProvider {
    /// The base configuration of `template` for `scheme`.
    fn template(&self, template: &TemplateRef, scheme: ColorScheme) -> Result<Value>;

    /// Whether `template` can be provided.
    fn contains(&self, template: &TemplateRef) -> bool;
}

/// Imported template: one configuration per scheme, or one shared by both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportedTemplate {
    PerScheme { light: Value, dark: Value },
    Shared(Value),
}

impl ImportedTemplate {
    fn for_scheme(&self, scheme: ColorScheme) -> &Value {
        match (self, scheme) {
            (ImportedTemplate::PerScheme { light, .. }, ColorScheme::Light) => light,
            (ImportedTemplate::PerScheme { dark, .. }, ColorScheme::Dark) => dark,
            (ImportedTemplate::Shared(value), _) => value,
        }
    }
}

/// Built-in templates plus templates imported at runtime.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    imported: BTreeMap<String, ImportedTemplate>,
}

impl TemplateCatalog {
    /// Create a catalog with only the built-in templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an imported template.
    pub fn import(&mut self, id: impl Into<String>, template: ImportedTemplate) {
        self.imported.insert(id.into(), template);
    }

    /// Register an imported template from JSON text.
    pub fn import_json(&mut self, id: impl Into<String>, json: &str) -> Result<()> {
        let template: ImportedTemplate = serde_json::from_str(json)?;
        self.import(id, template);
        Ok(())
    }

    /// Ids of the imported templates.
    pub fn imported_ids(&self) -> impl Iterator<Item = &str> {
        self.imported.keys().map(String::as_str)
    }
}

impl TemplateProvider for TemplateCatalog {
    fn template(&self, template: &TemplateRef, scheme: ColorScheme) -> Result<Value> {
        let unknown = || ThemeError::UnknownTemplate {
            id: template.to_string(),
        };
        match template.kind {
            TemplateKind::Builtin if template.id == DEFAULT_TEMPLATE_ID => {
                Ok(default_template(scheme))
            }
            TemplateKind::Builtin => Err(unknown()),
            TemplateKind::Imported => self
                .imported
                .get(&template.id)
                .map(|t| t.for_scheme(scheme).clone())
                .ok_or_else(unknown),
        }
    }

    fn contains(&self, template: &TemplateRef) -> bool {
        match template.kind {
            TemplateKind::Builtin => template.id == DEFAULT_TEMPLATE_ID,
            TemplateKind::Imported => self.imported.contains_key(&template.id),
        }
    }
}

/// The stock base configuration.
pub fn default_template(scheme: ColorScheme) -> Value {
    let (text, background, divider, action) = match scheme {
        ColorScheme::Light => (
            json!({
                "primary": "rgba(0, 0, 0, 0.87)",
                "secondary": "rgba(0, 0, 0, 0.6)",
                "disabled": "rgba(0, 0, 0, 0.38)"
            }),
            json!({ "default": "#fff", "paper": "#fff" }),
            "rgba(0, 0, 0, 0.12)",
            json!({ "active": "rgba(0, 0, 0, 0.54)", "hover": "rgba(0, 0, 0, 0.04)" }),
        ),
        ColorScheme::Dark => (
            json!({
                "primary": "#fff",
                "secondary": "rgba(255, 255, 255, 0.7)",
                "disabled": "rgba(255, 255, 255, 0.5)"
            }),
            json!({ "default": "#121212", "paper": "#121212" }),
            "rgba(255, 255, 255, 0.12)",
            json!({ "active": "#fff", "hover": "rgba(255, 255, 255, 0.08)" }),
        ),
    };

    let intents = match scheme {
        ColorScheme::Light => json!({
            "primary": { "main": "#1976d2", "light": "#42a5f5", "dark": "#1565c0", "contrastText": "#fff" },
            "secondary": { "main": "#9c27b0", "light": "#ba68c8", "dark": "#7b1fa2", "contrastText": "#fff" },
            "error": { "main": "#d32f2f", "light": "#ef5350", "dark": "#c62828", "contrastText": "#fff" },
            "warning": { "main": "#ed6c02", "light": "#ff9800", "dark": "#e65100", "contrastText": "#fff" },
            "info": { "main": "#0288d1", "light": "#03a9f4", "dark": "#01579b", "contrastText": "#fff" },
            "success": { "main": "#2e7d32", "light": "#4caf50", "dark": "#1b5e20", "contrastText": "#fff" }
        }),
        ColorScheme::Dark => json!({
            "primary": { "main": "#90caf9", "light": "#e3f2fd", "dark": "#42a5f5", "contrastText": "rgba(0, 0, 0, 0.87)" },
            "secondary": { "main": "#ce93d8", "light": "#f3e5f5", "dark": "#ab47bc", "contrastText": "rgba(0, 0, 0, 0.87)" },
            "error": { "main": "#f44336", "light": "#e57373", "dark": "#d32f2f", "contrastText": "#fff" },
            "warning": { "main": "#ffa726", "light": "#ffb74d", "dark": "#f57c00", "contrastText": "rgba(0, 0, 0, 0.87)" },
            "info": { "main": "#29b6f6", "light": "#4fc3f7", "dark": "#0288d1", "contrastText": "rgba(0, 0, 0, 0.87)" },
            "success": { "main": "#66bb6a", "light": "#81c784", "dark": "#388e3c", "contrastText": "rgba(0, 0, 0, 0.87)" }
        }),
    };

    let mut palette = json!({
        "mode": scheme.to_string(),
        "text": text,
        "background": background,
        "divider": divider,
        "action": action,
        "tonalOffset": 0.2,
        "contrastThreshold": 3
    });
    if let (Value::Object(palette_map), Value::Object(intent_map)) = (&mut palette, intents) {
        palette_map.extend(intent_map);
    }

    json!({
        "palette": palette,
        "spacing": 8,
        "shape": { "borderRadius": 4 },
        "breakpoints": {
            "values": { "xs": 0, "sm": 600, "md": 900, "lg": 1200, "xl": 1536 }
        },
        "typography": {
            "fontFamily": "\"Roboto\", \"Helvetica\", \"Arial\", sans-serif",
            "fontSize": 14,
            "h1": { "fontSize": "6rem", "fontWeight": 300 },
            "h2": { "fontSize": "3.75rem", "fontWeight": 300 },
            "h3": { "fontSize": "3rem", "fontWeight": 400 },
            "body1": { "fontSize": "1rem", "lineHeight": 1.5 },
            "button": { "textTransform": "uppercase", "fontWeight": 500 }
        },
        "shadows": [
            "none",
            "0px 2px 1px -1px rgba(0,0,0,0.2),0px 1px 1px 0px rgba(0,0,0,0.14),0px 1px 3px 0px rgba(0,0,0,0.12)",
            "0px 3px 1px -2px rgba(0,0,0,0.2),0px 2px 2px 0px rgba(0,0,0,0.14),0px 1px 5px 0px rgba(0,0,0,0.12)",
            "0px 3px 3px -2px rgba(0,0,0,0.2),0px 3px 4px 0px rgba(0,0,0,0.14),0px 1px 8px 0px rgba(0,0,0,0.12)"
        ],
        "zIndex": { "appBar": 1100, "drawer": 1200, "modal": 1300, "snackbar": 1400, "tooltip": 1500 },
        "components": {}
    })
}
