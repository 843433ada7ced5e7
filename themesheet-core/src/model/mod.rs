//! Data model: DSL placeholders and persisted records.

mod design;
mod dsl;

pub use design::{DesignRecord, ScopedEdits};
pub use dsl::{BreakpointDirection, BreakpointKey, DslNode};
