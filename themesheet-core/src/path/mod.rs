//! Path codec and path classification.

mod classify;
mod codec;

pub use classify::{is_scoped, partition, Partition, SCOPED_PREFIXES};
pub use codec::{
    entry_at_path, expand, flatten, get_at_path, is_primitive, join_path, normalize_path, parse_index,
    paths_overlap, remove_at_path, set_at_path, split_path, FlatPathMap,
};
