//! Auto-derived palette shades.
//!
//! For `palette.<color>.light`, `.dark` and `.contrastText` the rendering engine
//! generates a value from `palette.<color>.main`. When the user edits `main`
//! without touching the derived field, the editor shows that generated value
//! and marks it as automatic.

use crate::color;
use crate::config::{DEFAULT_CONTRAST_THRESHOLD, DEFAULT_TONAL_OFFSET};
use crate::error::ColorError;
use crate::path::{get_at_path, join_path, paths_overlap, split_path, FlatPathMap};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Which shade a derived path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedKind {
    Light,
    Dark,
    ContrastText,
}

impl DerivedKind {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "light" => Some(DerivedKind::Light),
            "dark" => Some(DerivedKind::Dark),
            "contrastText" => Some(DerivedKind::ContrastText),
            _ => None,
        }
    }
}

/// A derived palette path and the base it derives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTarget {
    /// `palette.<color>.main`
    pub base: String,
    pub kind: DerivedKind,
}

/// Recognize `palette.<color>.light|dark|contrastText`.
pub fn derived_target(path: &str) -> Option<DerivedTarget> {
    let segments = split_path(path);
    match segments.as_slice() {
        [root, color, key] if root == "palette" => DerivedKind::from_key(key).map(|kind| DerivedTarget {
            base: join_path(&join_path(root, color), "main"),
            kind,
        }),
        _ => None,
    }
}

/// `(light, dark)` tonal offsets from a configuration's palette.
fn tonal_offsets(config: &Value) -> (f64, f64) {
    match get_at_path(config, "palette.tonalOffset") {
        Some(Value::Number(n)) => {
            let offset = n.as_f64().unwrap_or(DEFAULT_TONAL_OFFSET);
            (offset, offset * 1.5)
        }
        Some(Value::Object(map)) => (
            map.get("light").and_then(Value::as_f64).unwrap_or(DEFAULT_TONAL_OFFSET),
            map.get("dark")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_TONAL_OFFSET * 1.5),
        ),
        _ => (DEFAULT_TONAL_OFFSET, DEFAULT_TONAL_OFFSET * 1.5),
    }
}

/// Compute the shade the rendering engine would generate from `main`.
pub fn derive_value(main: &str, kind: DerivedKind, config: &Value) -> Result<String, ColorError> {
    let (light, dark) = tonal_offsets(config);
    match kind {
        DerivedKind::Light => color::lighten(main, light),
        DerivedKind::Dark => color::darken(main, dark),
        DerivedKind::ContrastText => {
            let threshold = get_at_path(config, "palette.contrastThreshold")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_CONTRAST_THRESHOLD);
            color::contrast_text(main, threshold)
        }
    }
}

/// Decides when a derived path shows an automatic value.
#[derive(Debug, Clone)]
pub struct DerivedResolver {
    window: Duration,
    suppressed: HashMap<String, Instant>,
}

impl DerivedResolver {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            suppressed: HashMap::new(),
        }
    }

    /// Block auto-resolution of `path` for the suppression window.
    pub fn suppress(&mut self, path: &str, now: Instant) {
        self.suppressed.insert(path.to_string(), now + self.window);
    }

    /// Whether `path` is inside its suppression window.
    pub fn is_suppressed(&self, path: &str, now: Instant) -> bool {
        self.suppressed
            .get(path)
            .map(|until| now < *until)
            .unwrap_or(false)
    }

    /// Forget expired suppressions.
    pub fn prune(&mut self, now: Instant) {
        self.suppressed.retain(|_, until| now < *until);
    }

    /// Automatic value for `path`, if it currently has one.
    ///
    /// `edits` are the visual edits palette paths route to, `code` the flat
    /// map of the code override and `config` the resolved configuration.
    pub fn resolve(
        &self,
        path: &str,
        edits: &FlatPathMap,
        code: &FlatPathMap,
        config: &Value,
        now: Instant,
    ) -> Option<String> {
        let target = derived_target(path)?;
        if edits.contains_key(path) || self.is_suppressed(path, now) {
            return None;
        }
        if code.keys().any(|k| paths_overlap(k, &target.base)) {
            return None;
        }
        let main = edits.get(&target.base)?.as_str()?;
        match derive_value(main, target.kind, config) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!("No automatic value for {}: {}", path, err);
                None
            }
        }
    }
}

impl Default for DerivedResolver {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SUPPRESS_WINDOW)
    }
}
