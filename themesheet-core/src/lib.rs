//! themesheet-core - Layered theme resolution engine.
//!
//! This library merges a base template, composable presets, visual edits and a
//! safely evaluated code override into one UI theme configuration, keeping
//! every layer individually addressable, resettable and undoable.
//!
//! # Example
//!
//! ```no_run
//! use themesheet_core::{ColorScheme, EditStore, ResolveMode};
//! use serde_json::json;
//!
//! let mut store = EditStore::new();
//! store.toggle_composable("dense-spacing", true).unwrap();
//! store.set_edit("palette.primary.main", json!("#ff0000"));
//! store.apply_code_override("{ shape: { borderRadius: theme.spacing(1) } }");
//!
//! let theme = store.resolve(ColorScheme::Light, ResolveMode::Strict).unwrap();
//! println!("{}", theme.config);
//! ```

pub mod color;
pub mod composable;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod path;
pub mod resolve;
pub mod state;
pub mod template;

// Re-exports for convenience
pub use composable::{ComposableDefinition, ComposableRegistry, ComposableSelection};
pub use config::{ColorScheme, EngineConfig, ResolveMode};
pub use error::{ErrorCode, Result, ThemeError};
pub use model::{DesignRecord, DslNode, ScopedEdits};
pub use parser::{compile_override, CompiledOverride};
pub use path::{expand, flatten, FlatPathMap};
pub use resolve::{ResolvedTheme, StyleCallback};
pub use state::{EditStore, PathRead, StoreEvent};
pub use template::{TemplateCatalog, TemplateProvider, TemplateRef};

/// Resolve a saved design record against the stock templates and composables.
///
/// This is the high-level pipeline used for export:
/// 1. Restore the record into an edit store
/// 2. Compile its code override
/// 3. Resolve every layer for `scheme`
///
/// # Arguments
///
/// * `record` - The persisted design
/// * `scheme` - Color scheme to resolve; `None` uses the record's active scheme
/// * `mode` - Failure policy
pub fn resolve_design(
    record: &DesignRecord,
    scheme: Option<ColorScheme>,
    mode: ResolveMode,
) -> Result<ResolvedTheme> {
    let mut store = EditStore::from_design(
        record,
        TemplateCatalog::new(),
        ComposableRegistry::with_builtins(),
        EngineConfig::default(),
    )?;
    let scheme = scheme.unwrap_or(record.active_color_scheme);
    let resolved = store.resolve(scheme, mode)?;

    for warning in &resolved.warnings {
        tracing::warn!("{}", warning);
    }
    Ok(resolved)
}
