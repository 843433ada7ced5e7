//! Layer resolution: deep merge, placeholder hydration and the memoized resolver.

mod hydrate;
mod layers;
mod merge;

pub use hydrate::{hydrate, Hydrated, ResolutionContext, StyleCallback};
pub use layers::{resolve_layers, LayerInputs, LayerResolver, ResolvedTheme};
pub use merge::{deep_merge, merge_at_path, merge_flat, merged};
