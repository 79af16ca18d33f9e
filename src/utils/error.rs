//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a trace log
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Cannot open trace file {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed location {raw:?}{}: expected `path|line|col`", describe_offset(.offset))]
    MalformedLocation { raw: String, offset: Option<u64> },

    #[error("Malformed trace at byte {offset}: {reason}")]
    MalformedTrace { offset: u64, reason: String },

    #[error("Trace has more {what} than 32-bit ids can number")]
    TooManyIds { what: &'static str },
}

impl TraceError {
    /// Build a `MalformedTrace` error
    pub fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        Self::MalformedTrace {
            offset,
            reason: reason.into(),
        }
    }

    /// Attach a byte offset to a location error that was raised without one
    pub fn at_offset(self, at: u64) -> Self {
        match self {
            Self::MalformedLocation { raw, offset: None } => Self::MalformedLocation {
                raw,
                offset: Some(at),
            },
            other => other,
        }
    }
}

fn describe_offset(offset: &Option<u64>) -> String {
    offset
        .map(|o| format!(" at byte {}", o))
        .unwrap_or_default()
}

/// Errors raised while writing or loading a snapshot file
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Cannot write snapshot {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read snapshot {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Snapshot {} is not valid: {source}", .path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
