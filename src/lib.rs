//! Templar Trace
//!
//! Rebuilds template-instantiation call trees from Templight XML
//! trace logs and interns the source files they mention.
//!
//! This crate provides the core implementation for the
//! `templar` CLI tool.
//!
//! ## Getting Started
//!
//! ```no_run
//! use templar_trace::parser::parse_trace_file;
//! use templar_trace::utils::config::TraceReaderConfig;
//!
//! let parsed = parse_trace_file("trace.xml", &TraceReaderConfig::new())?;
//! for entry in parsed.tree.depth_first() {
//!     println!("{} {}", entry.kind, entry.context);
//! }
//! # Ok::<(), templar_trace::utils::TraceError>(())
//! ```

pub mod commands;
pub mod output;
pub mod parser;
pub mod tree;
pub mod utils;
