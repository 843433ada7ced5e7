//! Persisted design record.

use crate::config::ColorScheme;
use crate::error::{Result, ThemeError};
use crate::path::FlatPathMap;
use crate::template::TemplateRef;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Visual edits per color scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopedEdits {
    #[serde(default)]
    pub light: FlatPathMap,
    #[serde(default)]
    pub dark: FlatPathMap,
}

impl ScopedEdits {
    /// Edits for `scheme`.
    pub fn get(&self, scheme: ColorScheme) -> &FlatPathMap {
        match scheme {
            ColorScheme::Light => &self.light,
            ColorScheme::Dark => &self.dark,
        }
    }

    /// Mutable edits for `scheme`.
    pub fn get_mut(&mut self, scheme: ColorScheme) -> &mut FlatPathMap {
        match scheme {
            ColorScheme::Light => &mut self.light,
            ColorScheme::Dark => &mut self.dark,
        }
    }

    /// Whether neither scheme has edits.
    pub fn is_empty(&self) -> bool {
        self.light.is_empty() && self.dark.is_empty()
    }
}

/// One saved design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRecord {
    pub id: String,
    pub title: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: u64,
    pub selected_template: TemplateRef,
    #[serde(default)]
    pub global_edits: FlatPathMap,
    #[serde(default)]
    pub scoped_edits: ScopedEdits,
    #[serde(default)]
    pub code_override_source: String,
    #[serde(default)]
    pub active_color_scheme: ColorScheme,
}

impl DesignRecord {
    /// Parse a record from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a record from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ThemeError::InvalidDesign {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write a record to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> DesignRecord {
        let mut record = DesignRecord {
            id: "d1".into(),
            title: "Brand".into(),
            created_at: 1_700_000_000_000,
            selected_template: TemplateRef::default(),
            global_edits: FlatPathMap::new(),
            scoped_edits: ScopedEdits::default(),
            code_override_source: "{ spacing: 6 }".into(),
            active_color_scheme: ColorScheme::Dark,
        };
        record.global_edits.insert("shape.borderRadius".into(), json!(8));
        record
            .scoped_edits
            .light
            .insert("palette.primary.main".into(), json!("#ff0000"));
        record
    }

    #[test]
    fn test_json_layout_is_camel_case() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(value["selectedTemplate"], json!({ "kind": "builtin", "id": "default" }));
        assert_eq!(value["scopedEdits"]["light"]["palette.primary.main"], json!("#ff0000"));
        assert_eq!(value["activeColorScheme"], json!("dark"));
        assert_eq!(value["createdAt"], json!(1_700_000_000_000u64));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("design.json");
        sample().save(&path).unwrap();
        assert_eq!(DesignRecord::load(&path).unwrap(), sample());
    }

    #[test]
    fn test_load_rejects_malformed_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"id\": 3 }").unwrap();
        assert!(matches!(
            DesignRecord::load(&path),
            Err(ThemeError::InvalidDesign { .. })
        ));
    }

    #[test]
    fn test_optional_fields_default() {
        let record = DesignRecord::from_json(
            r#"{ "id": "x", "title": "t", "createdAt": 0, "selectedTemplate": { "kind": "imported", "id": "brand" } }"#,
        )
        .unwrap();
        assert!(record.global_edits.is_empty());
        assert!(record.scoped_edits.is_empty());
        assert_eq!(record.active_color_scheme, ColorScheme::Light);
    }
}
