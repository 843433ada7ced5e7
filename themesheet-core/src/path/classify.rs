//! Partitioning of paths into color-scheme-scoped and global state.

use super::codec::split_path;

/// Top-level keys whose values vary per color scheme.
pub const SCOPED_PREFIXES: [&str; 2] = ["palette", "shadows"];

/// Which layer family a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Varies per color scheme.
    Scoped,
    /// Shared across color schemes.
    Global,
}

/// Classify a path. Depends on the path string alone.
pub fn partition(path: &str) -> Partition {
    if is_scoped(path) {
        Partition::Scoped
    } else {
        Partition::Global
    }
}

/// Whether the first segment of `path` is one of [`SCOPED_PREFIXES`].
pub fn is_scoped(path: &str) -> bool {
    split_path(path)
        .first()
        .is_some_and(|head| SCOPED_PREFIXES.contains(&head.as_str()))
}
