//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use inspect::{
    execute_dump, execute_files, execute_inspect, render_files, render_tree, validate_args,
};
pub use models::{DumpArgs, InspectArgs, TraceArgs};
pub use utils::{display_version, validate_snapshot_file};
