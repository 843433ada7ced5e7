//! The edit store: every mutable layer behind a set of actions.

use super::derived::{derived_target, DerivedResolver};
use super::history::History;
use crate::composable::{
    ComposableDefinition, ComposableRegistry, ComposableSelection, ComposableToggles,
    SelectionImport,
};
use crate::config::{ColorScheme, EngineConfig, ResolveMode};
use crate::error::{Result, ThemeError};
use crate::model::{DesignRecord, ScopedEdits};
use crate::parser::{compile_override, CompiledOverride};
use crate::path::{get_at_path, is_scoped, normalize_path, paths_overlap, FlatPathMap};
use crate::resolve::{LayerInputs, LayerResolver, ResolvedTheme};
use crate::template::{TemplateCatalog, TemplateProvider, TemplateRef};
use serde_json::Value;
use std::time::Instant;

/// The persisted, undoable part of the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub selected_template: TemplateRef,
    pub global_edits: FlatPathMap,
    pub scoped_edits: ScopedEdits,
    pub composables: ComposableToggles,
    pub code_source: String,
    pub code_override: CompiledOverride,
}

/// What an action changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    EditChanged { path: String },
    CodeOverrideChanged,
    TemplateChanged,
    ComposablesChanged,
    SchemeChanged(ColorScheme),
    /// Undo or redo replaced the whole state.
    Restored,
    Saved,
}

/// Handle returned by [`EditStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// How a single path currently looks to an editor control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathRead {
    /// Resolved value for the active scheme.
    pub value: Option<Value>,
    /// A visual edit defines the path or part of it.
    pub has_visual_edit: bool,
    /// The code override defines the path or part of it.
    pub has_code_override: bool,
    /// `value` is generated from the palette base color.
    pub is_auto: bool,
}

/// Owner of the template selection, visual edits, composable toggles and code
/// override. All mutation goes through actions.
pub struct EditStore<P: TemplateProvider = TemplateCatalog> {
    config: EngineConfig,
    templates: P,
    registry: ComposableRegistry,
    resolver: LayerResolver,
    history: History<Snapshot>,
    derived: DerivedResolver,
    active_scheme: ColorScheme,
    unsaved: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl EditStore<TemplateCatalog> {
    /// A store on the default template with the stock composables.
    pub fn new() -> Self {
        Self::with_parts(
            TemplateCatalog::new(),
            ComposableRegistry::with_builtins(),
            EngineConfig::default(),
        )
    }
}

impl Default for EditStore<TemplateCatalog> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: TemplateProvider> EditStore<P> {
    /// A store on the default template.
    pub fn with_parts(templates: P, registry: ComposableRegistry, config: EngineConfig) -> Self {
        Self {
            resolver: LayerResolver::new(&config),
            history: History::new(Snapshot::default(), config.history_depth),
            derived: DerivedResolver::new(config.suppress_window),
            config,
            templates,
            registry,
            active_scheme: ColorScheme::default(),
            unsaved: false,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Restore a saved design. The result has no history and no unsaved changes.
    pub fn from_design(
        record: &DesignRecord,
        templates: P,
        registry: ComposableRegistry,
        config: EngineConfig,
    ) -> Result<Self> {
        if !templates.contains(&record.selected_template) {
            return Err(ThemeError::UnknownTemplate {
                id: record.selected_template.to_string(),
            });
        }
        let mut store = Self::with_parts(templates, registry, config);
        let snapshot = Snapshot {
            selected_template: record.selected_template.clone(),
            global_edits: record.global_edits.clone(),
            scoped_edits: record.scoped_edits.clone(),
            composables: ComposableToggles::new(),
            code_source: record.code_override_source.clone(),
            code_override: compile_override(&record.code_override_source, &store.config),
        };
        store.history.reset(snapshot);
        store.active_scheme = record.active_color_scheme;
        tracing::debug!("Loaded design '{}' ({})", record.id, record.title);
        Ok(store)
    }

    /// Capture the persisted subset as a design record.
    pub fn to_design(&self, id: impl Into<String>, title: impl Into<String>, created_at: u64) -> DesignRecord {
        let state = self.history.present();
        DesignRecord {
            id: id.into(),
            title: title.into(),
            created_at,
            selected_template: state.selected_template.clone(),
            global_edits: state.global_edits.clone(),
            scoped_edits: state.scoped_edits.clone(),
            code_override_source: state.code_source.clone(),
            active_color_scheme: self.active_scheme,
        }
    }

    // ==================== accessors ====================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.history.present()
    }

    pub fn selected_template(&self) -> &TemplateRef {
        &self.snapshot().selected_template
    }

    pub fn global_edits(&self) -> &FlatPathMap {
        &self.snapshot().global_edits
    }

    pub fn scoped_edits(&self, scheme: ColorScheme) -> &FlatPathMap {
        self.snapshot().scoped_edits.get(scheme)
    }

    pub fn composables(&self) -> &ComposableToggles {
        &self.snapshot().composables
    }

    pub fn code_source(&self) -> &str {
        &self.snapshot().code_source
    }

    pub fn code_override(&self) -> &CompiledOverride {
        &self.snapshot().code_override
    }

    pub fn active_scheme(&self) -> ColorScheme {
        self.active_scheme
    }

    pub fn registry(&self) -> &ComposableRegistry {
        &self.registry
    }

    pub fn templates(&self) -> &P {
        &self.templates
    }

    /// Mutable template provider, e.g. to import templates. Clears the memo.
    pub fn templates_mut(&mut self) -> &mut P {
        self.resolver.clear_cache();
        &mut self.templates
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== subscriptions ====================

    /// Register a listener called after every state-changing action.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    /// Apply `change` to a copy of the state and checkpoint it.
    /// Returns `false` when nothing changed.
    fn commit(&mut self, event: StoreEvent, change: impl FnOnce(&mut Snapshot)) -> bool {
        let mut next = self.history.present().clone();
        change(&mut next);
        if !self.history.commit(next) {
            return false;
        }
        self.unsaved = true;
        self.notify(event);
        true
    }

    // ==================== actions ====================

    /// Set a visual edit, routed by path partition.
    pub fn set_edit(&mut self, path: &str, value: Value) {
        let path = normalize_path(path);
        let scheme = self.active_scheme;
        let key = path.clone();
        self.commit(StoreEvent::EditChanged { path }, move |state| {
            routed_edits(state, &key, scheme).insert(key, value);
        });
    }

    /// Remove a visual edit. Absent paths are a no-op.
    pub fn remove_edit(&mut self, path: &str) -> bool {
        let path = normalize_path(path);
        let scheme = self.active_scheme;
        let key = path.clone();
        self.commit(StoreEvent::EditChanged { path }, move |state| {
            routed_edits(state, &key, scheme).shift_remove(&key);
        })
    }

    /// Replace the code override. Evaluation errors are kept in the state.
    pub fn apply_code_override(&mut self, source: &str) {
        let compiled = compile_override(source, &self.config);
        if let Some(error) = &compiled.error {
            tracing::debug!("Applied code override with error: {}", error);
        }
        self.commit(StoreEvent::CodeOverrideChanged, |state| {
            state.code_source = source.to_string();
            state.code_override = compiled;
        });
    }

    /// Drop the code override.
    pub fn clear_code_override(&mut self) -> bool {
        self.commit(StoreEvent::CodeOverrideChanged, |state| {
            state.code_source.clear();
            state.code_override = CompiledOverride::default();
        })
    }

    /// Undo whatever defines `path`, highest layer first.
    ///
    /// When the code override defines the path (exactly, above or below it)
    /// the whole override is cleared; otherwise every routed visual edit at,
    /// above or below the path is removed in one undo step. Returns `false`
    /// when nothing defined the path.
    pub fn reset_path(&mut self, path: &str) -> bool {
        self.reset_path_at(path, Instant::now())
    }

    fn reset_path_at(&mut self, path: &str, now: Instant) -> bool {
        let path = normalize_path(path);
        if derived_target(&path).is_some() {
            self.derived.suppress(&path, now);
        }
        let code_defines = self
            .code_override()
            .flat
            .keys()
            .any(|k| paths_overlap(k, &path));
        if code_defines {
            tracing::debug!("Reset of '{}' clears the code override", path);
            return self.clear_code_override();
        }
        let scheme = self.active_scheme;
        let key = path.clone();
        self.commit(StoreEvent::EditChanged { path }, move |state| {
            routed_edits(state, &key, scheme).retain(|edited, _| !paths_overlap(edited, &key));
        })
    }

    /// Select another template. Without `keep_edits` every layer is cleared.
    pub fn switch_template(&mut self, template: TemplateRef, keep_edits: bool) -> Result<()> {
        if !self.templates.contains(&template) {
            return Err(ThemeError::UnknownTemplate {
                id: template.to_string(),
            });
        }
        self.commit(StoreEvent::TemplateChanged, |state| {
            state.selected_template = template;
            if !keep_edits {
                state.global_edits.clear();
                state.scoped_edits = ScopedEdits::default();
                state.composables.clear();
                state.code_source.clear();
                state.code_override = CompiledOverride::default();
            }
        });
        Ok(())
    }

    /// Enable or disable a composable.
    ///
    /// Unknown ids are still recorded, so resolution applies its failure
    /// policy to them, but the action reports them.
    pub fn toggle_composable(&mut self, id: &str, enabled: bool) -> Result<()> {
        self.commit(StoreEvent::ComposablesChanged, |state| {
            state.composables.insert(id.to_string(), enabled);
        });
        if self.registry.contains(id) {
            Ok(())
        } else {
            Err(ThemeError::UnknownComposable { id: id.to_string() })
        }
    }

    /// Register an additional composable.
    pub fn register_composable(&mut self, definition: ComposableDefinition) -> Result<()> {
        self.registry.register(definition)?;
        self.resolver.clear_cache();
        Ok(())
    }

    /// Replace the composable toggles with an imported selection envelope.
    pub fn import_composables(&mut self, json: &str) -> Result<SelectionImport> {
        let imported = self.registry.import_selection(json)?;
        let toggles = imported.toggles.clone();
        self.commit(StoreEvent::ComposablesChanged, |state| {
            state.composables = toggles;
        });
        Ok(imported)
    }

    /// Selection envelope of the enabled composables.
    pub fn export_composables(&self) -> ComposableSelection {
        self.registry.export_selection(self.composables())
    }

    /// Switch the scheme edits are routed to. Not an undoable change.
    pub fn set_active_scheme(&mut self, scheme: ColorScheme) {
        if self.active_scheme != scheme {
            self.active_scheme = scheme;
            self.notify(StoreEvent::SchemeChanged(scheme));
        }
    }

    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        self.unsaved = true;
        self.notify(StoreEvent::Restored);
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        self.unsaved = true;
        self.notify(StoreEvent::Restored);
        true
    }

    /// Clear the unsaved flag after the caller persisted the design.
    pub fn mark_saved(&mut self) {
        self.unsaved = false;
        self.notify(StoreEvent::Saved);
    }

    // ==================== per-path API ====================

    /// Resolved value and provenance of `path` for the active scheme.
    pub fn read(&mut self, path: &str) -> PathRead {
        self.read_at(path, Instant::now())
    }

    /// [`Self::read`] with an explicit clock.
    pub fn read_at(&mut self, path: &str, now: Instant) -> PathRead {
        let path = normalize_path(path);
        self.derived.prune(now);
        let config = match self.preview() {
            Ok(resolved) => resolved.config,
            Err(err) => {
                tracing::warn!("Preview failed: {}", err);
                Value::Null
            }
        };

        let scheme = self.active_scheme;
        let state = self.history.present();
        let edits = if is_scoped(&path) {
            state.scoped_edits.get(scheme)
        } else {
            &state.global_edits
        };
        let code = &state.code_override.flat;
        let auto = self.derived.resolve(&path, edits, code, &config, now);

        PathRead {
            has_visual_edit: edits.keys().any(|k| paths_overlap(k, &path)),
            has_code_override: code.keys().any(|k| paths_overlap(k, &path)),
            is_auto: auto.is_some(),
            value: match auto {
                Some(derived) => Some(Value::String(derived)),
                None => get_at_path(&config, &path).cloned(),
            },
        }
    }

    /// Write a visual edit at `path`.
    pub fn write(&mut self, path: &str, value: Value) {
        self.set_edit(path, value);
    }

    /// Reset `path` (see [`Self::reset_path`]).
    pub fn reset(&mut self, path: &str) -> bool {
        self.reset_path(path)
    }

    // ==================== resolution ====================

    /// Resolve every layer for `scheme`.
    pub fn resolve(&mut self, scheme: ColorScheme, mode: ResolveMode) -> Result<ResolvedTheme> {
        let state = self.history.present();
        let template = self.templates.template(&state.selected_template, scheme)?;
        let inputs = LayerInputs {
            template_id: &state.selected_template,
            template: &template,
            scheme,
            global_edits: &state.global_edits,
            scoped_edits: state.scoped_edits.get(scheme),
            composables: &state.composables,
            code_override: &state.code_override,
        };
        self.resolver.resolve(&inputs, &self.registry, mode)
    }

    /// Lenient resolution for the active scheme.
    pub fn preview(&mut self) -> Result<ResolvedTheme> {
        self.resolve(self.active_scheme, ResolveMode::Lenient)
    }
}

impl<P: TemplateProvider> std::fmt::Debug for EditStore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditStore")
            .field("state", self.history.present())
            .field("active_scheme", &self.active_scheme)
            .field("unsaved", &self.unsaved)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

/// Edit map `path` belongs to.
fn routed_edits<'a>(state: &'a mut Snapshot, path: &str, scheme: ColorScheme) -> &'a mut FlatPathMap {
    if is_scoped(path) {
        state.scoped_edits.get_mut(scheme)
    } else {
        &mut state.global_edits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    // ==================== edit routing tests ====================

    #[test]
    fn test_set_edit_routes_by_partition() {
        let mut store = EditStore::new();
        store.set_edit("palette.primary.main", json!("#ff0000"));
        store.set_edit("shape.borderRadius", json!(2));
        assert_eq!(store.scoped_edits(ColorScheme::Light).len(), 1);
        assert!(store.scoped_edits(ColorScheme::Dark).is_empty());
        assert_eq!(store.global_edits().get("shape.borderRadius"), Some(&json!(2)));

        store.set_active_scheme(ColorScheme::Dark);
        store.set_edit("shadows[1]", json!("none"));
        assert!(store.scoped_edits(ColorScheme::Dark).contains_key("shadows.1"));
    }

    #[test]
    fn test_remove_absent_edit_is_noop() {
        let mut store = EditStore::new();
        assert!(!store.remove_edit("spacing"));
        assert!(!store.can_undo());
        assert!(!store.has_unsaved_changes());
    }

    // ==================== reset tests ====================

    #[test]
    fn test_reset_prefers_code_override() {
        let mut store = EditStore::new();
        store.set_edit("palette.primary.main", json!("#ff0000"));
        store.apply_code_override("{ palette: { primary: { main: '#00ff00' } } }");

        assert!(store.reset_path("palette.primary.main"));
        assert!(store.code_source().is_empty());
        assert!(store.scoped_edits(ColorScheme::Light).contains_key("palette.primary.main"));

        assert!(store.reset_path("palette.primary.main"));
        assert!(store.scoped_edits(ColorScheme::Light).is_empty());
        assert!(!store.reset_path("palette.primary.main"));
    }

    #[test]
    fn test_reset_on_ancestor_code_path() {
        let mut store = EditStore::new();
        store.apply_code_override("{ palette: { primary: { main: '#00ff00' } } }");
        assert!(store.reset_path("palette.primary"));
        assert!(store.code_override().is_empty());
    }

    #[test]
    fn test_reset_removes_descendant_edits() {
        let mut store = EditStore::new();
        store.set_edit("palette.primary.main", json!("#ff0000"));
        store.set_edit("palette.primary.dark", json!("#aa0000"));
        store.set_edit("palette.secondary.main", json!("#00aa00"));
        assert!(store.read("palette.primary").has_visual_edit);

        assert!(store.reset("palette.primary"));
        let edits = store.scoped_edits(ColorScheme::Light);
        assert_eq!(edits.keys().collect::<Vec<_>>(), vec!["palette.secondary.main"]);
        assert!(!store.read("palette.primary").has_visual_edit);
        assert!(!store.reset("palette.primary"));

        assert!(store.undo());
        assert_eq!(store.scoped_edits(ColorScheme::Light).len(), 3);
    }

    #[test]
    fn test_reset_removes_ancestor_edit() {
        let mut store = EditStore::new();
        store.set_edit("shape", json!({ "borderRadius": 2 }));
        assert!(store.reset_path("shape.borderRadius"));
        assert!(store.global_edits().is_empty());
    }

    #[test]
    fn test_reapplied_edit_after_nested_edit_is_not_stale() {
        let mut store = EditStore::new();
        store.set_edit("zIndex", json!(5));
        store.set_edit("zIndex.modal", json!(9));
        let nested = store.preview().unwrap().config;
        assert_eq!(nested["zIndex"], json!({ "modal": 9 }));

        assert!(store.remove_edit("zIndex"));
        store.set_edit("zIndex", json!(5));
        let resolved = store.preview().unwrap().config;
        assert_eq!(resolved["zIndex"], json!(5));
    }

    // ==================== template tests ====================

    #[test]
    fn test_switch_template_clears_layers() {
        let mut store = EditStore::new();
        store
            .templates_mut()
            .import_json("brand", r#"{ "spacing": 6 }"#)
            .unwrap();
        store.set_edit("shape.borderRadius", json!(2));
        store.toggle_composable("rounded", true).unwrap();

        store
            .switch_template(TemplateRef::imported("brand"), true)
            .unwrap();
        assert_eq!(store.global_edits().len(), 1);

        store.switch_template(TemplateRef::default(), false).unwrap();
        assert!(store.global_edits().is_empty());
        assert!(store.composables().is_empty());
    }

    #[test]
    fn test_switch_to_unknown_template() {
        let mut store = EditStore::new();
        let err = store
            .switch_template(TemplateRef::imported("missing"), false)
            .unwrap_err();
        assert!(matches!(err, ThemeError::UnknownTemplate { .. }));
    }

    // ==================== history tests ====================

    #[test]
    fn test_undo_redo_and_dedup() {
        let mut store = EditStore::new();
        store.set_edit("spacing", json!(4));
        store.set_edit("spacing", json!(4));
        store.set_edit("spacing", json!(6));
        assert!(store.undo());
        assert_eq!(store.global_edits().get("spacing"), Some(&json!(4)));
        assert!(store.undo());
        assert!(store.global_edits().is_empty());
        assert!(!store.undo());
        assert!(store.redo());
        assert_eq!(store.global_edits().get("spacing"), Some(&json!(4)));
    }

    #[test]
    fn test_scheme_switch_not_in_history() {
        let mut store = EditStore::new();
        store.set_active_scheme(ColorScheme::Dark);
        assert!(!store.can_undo());
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_history_depth_bound() {
        let mut store = EditStore::with_parts(
            TemplateCatalog::new(),
            ComposableRegistry::with_builtins(),
            EngineConfig::with_history_depth(2),
        );
        for i in 0..5 {
            store.set_edit("spacing", json!(i));
        }
        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
        assert_eq!(store.global_edits().get("spacing"), Some(&json!(2)));
    }

    #[test]
    fn test_mark_saved() {
        let mut store = EditStore::new();
        store.set_edit("spacing", json!(4));
        assert!(store.has_unsaved_changes());
        store.mark_saved();
        assert!(!store.has_unsaved_changes());
    }

    // ==================== composable tests ====================

    #[test]
    fn test_toggle_unknown_composable_is_recorded() {
        let mut store = EditStore::new();
        let err = store.toggle_composable("ghost", true).unwrap_err();
        assert!(matches!(err, ThemeError::UnknownComposable { .. }));
        assert_eq!(store.composables().get("ghost"), Some(&true));
    }

    #[test]
    fn test_export_import_composables() {
        let mut store = EditStore::new();
        store.toggle_composable("rounded", true).unwrap();
        store.toggle_composable("square", false).unwrap();
        let json = serde_json::to_string(&store.export_composables()).unwrap();

        let mut other = EditStore::new();
        let imported = other.import_composables(&json).unwrap();
        assert!(imported.warnings.is_empty());
        assert_eq!(other.composables().get("rounded"), Some(&true));
        assert_eq!(other.composables().len(), 1);
    }

    // ==================== read tests ====================

    #[test]
    fn test_read_provenance() {
        let mut store = EditStore::new();
        store.set_edit("shape.borderRadius", json!(3));
        store.apply_code_override("{ typography: { fontSize: 12 } }");

        let radius = store.read("shape.borderRadius");
        assert_eq!(radius.value, Some(json!(3)));
        assert!(radius.has_visual_edit);
        assert!(!radius.has_code_override);

        let font = store.read("typography.fontSize");
        assert_eq!(font.value, Some(json!(12)));
        assert!(font.has_code_override);

        let untouched = store.read("spacing");
        assert_eq!(untouched, PathRead { value: Some(json!(8)), ..PathRead::default() });
    }

    #[test]
    fn test_read_auto_derived_and_suppressed() {
        let mut store = EditStore::new();
        store.set_edit("palette.primary.main", json!("#ff0000"));

        let light = store.read("palette.primary.light");
        assert!(light.is_auto);
        assert_eq!(light.value, Some(json!("rgb(255, 51, 51)")));

        let now = Instant::now();
        store.reset_path_at("palette.primary.light", now);
        assert!(!store.read_at("palette.primary.light", now).is_auto);
        let later = now + Duration::from_millis(200);
        assert!(store.read_at("palette.primary.light", later).is_auto);
    }

    // ==================== subscription tests ====================

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut store = EditStore::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let id = store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        store.set_edit("spacing", json!(4));
        store.set_edit("spacing", json!(4));
        store.undo();
        assert_eq!(
            *events.borrow(),
            vec![
                StoreEvent::EditChanged { path: "spacing".into() },
                StoreEvent::Restored,
            ]
        );

        assert!(store.unsubscribe(id));
        store.set_edit("spacing", json!(5));
        assert_eq!(events.borrow().len(), 2);
    }

    // ==================== design tests ====================

    #[test]
    fn test_design_round_trip() {
        let mut store = EditStore::new();
        store.set_edit("palette.primary.main", json!("#ff0000"));
        store.apply_code_override("{ spacing: 5 }");
        store.set_active_scheme(ColorScheme::Dark);

        let record = store.to_design("d1", "Brand", 42);
        let restored = EditStore::from_design(
            &record,
            TemplateCatalog::new(),
            ComposableRegistry::with_builtins(),
            EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(restored.active_scheme(), ColorScheme::Dark);
        assert_eq!(restored.code_override(), store.code_override());
        assert_eq!(restored.scoped_edits(ColorScheme::Light), store.scoped_edits(ColorScheme::Light));
        assert!(!restored.has_unsaved_changes());
        assert!(!restored.can_undo());
    }
}
