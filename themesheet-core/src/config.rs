//! Configuration constants and settings for the engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of undo checkpoints kept before the oldest is evicted.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Deepest nesting the code evaluator accepts before bailing out.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Longest code override source accepted, in bytes.
pub const DEFAULT_MAX_SOURCE_LEN: usize = 64 * 1024;

/// Number of resolved configurations kept in the resolution memo.
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

/// Spacing factor used when the template does not define a numeric `spacing`.
pub const DEFAULT_SPACING_FACTOR: f64 = 8.0;

/// How long a manual reset keeps a derived value from flipping back to auto.
pub const DEFAULT_SUPPRESS_WINDOW: Duration = Duration::from_millis(100);

/// Breakpoint step; `down` boundaries sit `STEP / 100` below the next `up`.
pub const BREAKPOINT_STEP: f64 = 5.0;

/// Breakpoint widths in pixels, in ascending order.
pub const DEFAULT_BREAKPOINTS: [(&str, f64); 5] = [
    ("xs", 0.0),
    ("sm", 600.0),
    ("md", 900.0),
    ("lg", 1200.0),
    ("xl", 1536.0),
];

/// Default tonal offset for generated light/dark palette shades.
pub const DEFAULT_TONAL_OFFSET: f64 = 0.2;

/// Default WCAG contrast threshold for generated contrast text.
pub const DEFAULT_CONTRAST_THRESHOLD: f64 = 3.0;

/// Default coefficient for `emphasize`.
pub const DEFAULT_EMPHASIS: f64 = 0.15;

/// Composable selection envelope format version.
pub const SELECTION_FORMAT_VERSION: u32 = 1;

/// Color scheme a configuration is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// Both schemes, light first.
    pub const ALL: [ColorScheme; 2] = [ColorScheme::Light, ColorScheme::Dark];

    /// Parse a scheme name (`light` / `dark`, case-insensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(ColorScheme::Light),
            "dark" => Some(ColorScheme::Dark),
            _ => None,
        }
    }

    /// The other scheme.
    pub fn opposite(&self) -> Self {
        match self {
            ColorScheme::Light => ColorScheme::Dark,
            ColorScheme::Dark => ColorScheme::Light,
        }
    }
}

impl std::fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorScheme::Light => write!(f, "light"),
            ColorScheme::Dark => write!(f, "dark"),
        }
    }
}

/// Failure policy of the layer resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Any stage error aborts resolution. Export and commit paths.
    Strict,
    /// Stage errors are logged and the stage contributes nothing. Live preview.
    #[default]
    Lenient,
}

impl std::fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveMode::Strict => write!(f, "strict"),
            ResolveMode::Lenient => write!(f, "lenient"),
        }
    }
}

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Undo history depth.
    pub history_depth: usize,
    /// Maximum nesting depth of a code override.
    pub max_nesting_depth: usize,
    /// Maximum code override length in bytes.
    pub max_source_len: usize,
    /// Resolution memo capacity.
    pub cache_capacity: usize,
    /// Window during which a reset derived value stays non-auto.
    pub suppress_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_source_len: DEFAULT_MAX_SOURCE_LEN,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            suppress_window: DEFAULT_SUPPRESS_WINDOW,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with a custom history depth.
    pub fn with_history_depth(history_depth: usize) -> Self {
        Self {
            history_depth,
            ..Default::default()
        }
    }
}

/// Number formatting shared by media queries and spacing strings.
pub mod number {
    /// Format a float the way a style sheet expects (`600`, `899.95`).
    #[inline]
    pub fn css(n: f64) -> String {
        if n.fract() == 0.0 && n.abs() < 1e15 {
            format!("{}", n as i64)
        } else {
            format!("{}", n)
        }
    }
}
