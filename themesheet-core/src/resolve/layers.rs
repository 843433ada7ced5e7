//! Layer resolver: merges every layer into one configuration.

use super::hydrate::{hydrate, ResolutionContext, StyleCallback};
use super::merge::{deep_merge, merge_flat};
use crate::composable::{ComposableRegistry, ComposableToggles};
use crate::config::{ColorScheme, EngineConfig, ResolveMode};
use crate::error::{Result, ThemeError};
use crate::parser::CompiledOverride;
use crate::path::{remove_at_path, FlatPathMap};
use crate::template::TemplateRef;
use lru::LruCache;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

/// Everything one resolution depends on.
#[derive(Debug, Clone, Copy)]
pub struct LayerInputs<'a> {
    pub template_id: &'a TemplateRef,
    /// Base configuration of `template_id` for `scheme`.
    pub template: &'a Value,
    pub scheme: ColorScheme,
    pub global_edits: &'a FlatPathMap,
    /// Scoped edits of `scheme`.
    pub scoped_edits: &'a FlatPathMap,
    pub composables: &'a ComposableToggles,
    pub code_override: &'a CompiledOverride,
}

/// Output of the layer resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTheme {
    /// Merged configuration tree.
    pub config: Value,
    /// Style callbacks by dot-path. Their paths are absent from `config`.
    pub callbacks: Vec<(String, StyleCallback)>,
    /// Stage errors swallowed in lenient mode.
    pub warnings: Vec<String>,
}

impl ResolvedTheme {
    /// Callback registered at `path`.
    pub fn callback(&self, path: &str) -> Option<&StyleCallback> {
        self.callbacks
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, callback)| callback)
    }
}

/// Fixed-precedence resolver with a small least-recently-used memo.
pub struct LayerResolver {
    /// `None` when the configured capacity is zero.
    cache: Option<LruCache<u64, ResolvedTheme>>,
}

impl std::fmt::Debug for LayerResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerResolver")
            .field("cached", &self.cached())
            .finish()
    }
}

impl Default for LayerResolver {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl LayerResolver {
    /// Create a resolver sized by `config.cache_capacity`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            cache: NonZeroUsize::new(config.cache_capacity).map(LruCache::new),
        }
    }

    /// Drop every memoized result.
    pub fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    /// Number of memoized results.
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, LruCache::len)
    }

    /// Whether a result for these inputs is memoized. Does not touch recency.
    pub fn is_cached(
        &self,
        inputs: &LayerInputs<'_>,
        registry: &ComposableRegistry,
        mode: ResolveMode,
    ) -> bool {
        let key = cache_key(inputs, registry, mode);
        self.cache.as_ref().is_some_and(|cache| cache.contains(&key))
    }

    /// Resolve, reusing a memoized result for structurally equal inputs.
    pub fn resolve(
        &mut self,
        inputs: &LayerInputs<'_>,
        registry: &ComposableRegistry,
        mode: ResolveMode,
    ) -> Result<ResolvedTheme> {
        let key = cache_key(inputs, registry, mode);
        if let Some(hit) = self.cache.as_mut().and_then(|cache| cache.get(&key)) {
            tracing::debug!("Resolution cache hit for {} ({})", inputs.scheme, mode);
            return Ok(hit.clone());
        }

        let resolved = resolve_layers(inputs, registry, mode)?;
        if let Some(cache) = self.cache.as_mut() {
            cache.put(key, resolved.clone());
        }
        Ok(resolved)
    }
}

/// Apply a stage's failure policy. `None` means the stage contributes nothing.
fn stage<T>(result: Result<T>, mode: ResolveMode, warnings: &mut Vec<String>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if mode == ResolveMode::Lenient && err.is_recoverable() => {
            tracing::warn!("Skipping layer contribution: {}", err);
            warnings.push(err.to_string());
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Resolve without the memo.
///
/// Precedence, lowest first: template, enabled composables in registry order,
/// global edits, scoped edits of the scheme, hydrated code override.
pub fn resolve_layers(
    inputs: &LayerInputs<'_>,
    registry: &ComposableRegistry,
    mode: ResolveMode,
) -> Result<ResolvedTheme> {
    tracing::debug!(
        "Resolving {} for {} ({})",
        inputs.template_id,
        inputs.scheme,
        mode
    );
    let mut warnings = Vec::new();
    let mut config = inputs.template.clone();

    for definition in registry.list() {
        if inputs.composables.get(&definition.id) != Some(&true) {
            continue;
        }
        let fragment = registry.resolve(&definition.id, inputs.scheme);
        if let Some(fragment) = stage(fragment, mode, &mut warnings)? {
            deep_merge(&mut config, &fragment);
        }
    }
    for (id, enabled) in inputs.composables {
        if *enabled && !registry.contains(id) {
            let unknown = Err(ThemeError::UnknownComposable { id: id.clone() });
            stage::<()>(unknown, mode, &mut warnings)?;
        }
    }

    merge_flat(&mut config, inputs.global_edits);
    merge_flat(&mut config, inputs.scoped_edits);

    let mut callbacks = Vec::new();
    let code = inputs.code_override;
    let evaluated = match code.as_error() {
        Some(err) => Err(err),
        None => Ok(&code.compiled),
    };
    if let Some(compiled) = stage(evaluated, mode, &mut warnings)? {
        if !compiled.is_empty_object() {
            let context = ResolutionContext::new(config.clone(), inputs.scheme);
            if let Some(hydrated) = stage(hydrate(compiled, &context, mode), mode, &mut warnings)? {
                deep_merge(&mut config, &hydrated.value);
                for (path, _) in &hydrated.callbacks {
                    remove_at_path(&mut config, path);
                }
                warnings.extend(hydrated.warnings);
                callbacks = hydrated.callbacks;
            }
        }
    }

    Ok(ResolvedTheme {
        config,
        callbacks,
        warnings,
    })
}

fn cache_key(inputs: &LayerInputs<'_>, registry: &ComposableRegistry, mode: ResolveMode) -> u64 {
    let mut hasher = DefaultHasher::new();
    inputs.template_id.hash(&mut hasher);
    hash_value(inputs.template, &mut hasher);
    inputs.scheme.hash(&mut hasher);
    hash_flat(inputs.global_edits, &mut hasher);
    hash_flat(inputs.scoped_edits, &mut hasher);
    inputs.composables.hash(&mut hasher);
    hash_value(&inputs.code_override.compiled.to_value(), &mut hasher);
    inputs.code_override.error.hash(&mut hasher);
    for definition in registry.list() {
        definition.id.hash(&mut hasher);
    }
    mode.hash(&mut hasher);
    hasher.finish()
}

/// Hash entries in map order. Edits apply in that order, so two maps with the
/// same entries in a different order may resolve differently.
fn hash_flat(flat: &FlatPathMap, hasher: &mut DefaultHasher) {
    for (key, value) in flat {
        key.hash(hasher);
        hash_value(value, hasher);
    }
}

/// Hash a value structurally, object keys in map order.
fn hash_value(value: &Value, hasher: &mut DefaultHasher) {
    match value {
        Value::Null => 0u8.hash(hasher),
        Value::Bool(b) => (1u8, b).hash(hasher),
        Value::Number(n) => (2u8, n.to_string()).hash(hasher),
        Value::String(s) => (3u8, s).hash(hasher),
        Value::Array(items) => {
            (4u8, items.len()).hash(hasher);
            items.iter().for_each(|item| hash_value(item, hasher));
        }
        Value::Object(map) => {
            (5u8, map.len()).hash(hasher);
            hash_flat(map, hasher);
        }
    }
}
