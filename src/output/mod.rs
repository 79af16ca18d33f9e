//! Output writers for trace snapshots.

pub mod json;

// Re-export main functions
pub use json::{read_snapshot, snapshot_to_string, write_snapshot};
