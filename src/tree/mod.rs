//! The reconstructed instantiation tree and ways to look at it.
//!
//! - `entry`: entries, the owning tree, borrowed navigation handles
//! - `iter`: depth-first traversal
//! - `walker`: visitor walks threading per-node state
//! - `model`: table/list adapter for views

pub mod entry;
pub mod iter;
pub mod model;
pub mod walker;

// Re-export main types
pub use entry::{EntryId, EntryRef, TraceEntry, TraceTree};
pub use iter::DepthFirstIter;
pub use model::{CellValue, Column, DataRole, ModelIndex, TraceListModel};
pub use walker::{walk_tree, EntryVisitor};
