//! Editor state: the edit store, its undo history and auto-derived values.

mod derived;
mod history;
mod store;

pub use derived::{derive_value, derived_target, DerivedKind, DerivedResolver, DerivedTarget};
pub use history::History;
pub use store::{EditStore, PathRead, Snapshot, StoreEvent, SubscriptionId};
