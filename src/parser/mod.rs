//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Reading the Templight XML event stream
//! - Interning source file paths
//! - Rebuilding the instantiation tree
//! - Defining the snapshot schema

pub mod kind;
pub mod location;
pub mod schema;
pub mod source_files;
pub mod trace_reader;
mod xml_events;

// Re-export main types
pub use kind::EntryKind;
pub use location::{FileId, SourceLocation};
pub use schema::{EntryRecord, SourceFileRecord, TraceSnapshot};
pub use source_files::SourceFileRegistry;
pub use trace_reader::{parse_trace_file, read_source_files, ParsedTrace, TraceReader};
