//! Output JSON schema definitions for trace snapshots.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use super::kind::EntryKind;
use super::location::{FileId, SourceLocation};
use super::trace_reader::ParsedTrace;
use crate::tree::EntryId;
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level snapshot structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSnapshot {
    /// Schema version for compatibility checking
    pub version: String,

    /// Trace file the snapshot was built from
    pub source: String,

    /// Every referenced source file, in id order
    pub files: Vec<SourceFileRecord>,

    /// Every entry, each top-level subtree in depth-first order
    pub entries: Vec<EntryRecord>,

    /// Timestamp when snapshot was generated
    pub generated_at: String,
}

/// One registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFileRecord {
    pub id: FileId,
    pub path: String,
}

/// One tree entry, flattened with a parent link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: EntryId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntryId>,

    pub kind: EntryKind,
    pub context: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,

    /// Seconds
    pub duration: f64,

    /// Bytes
    pub memory_usage: i64,
}

impl TraceSnapshot {
    /// Flatten a parsed trace
    pub fn from_parsed(parsed: &ParsedTrace, source: impl Into<String>) -> Self {
        use chrono::Utc;

        let files = parsed
            .files
            .iter()
            .map(|(id, path)| SourceFileRecord {
                id,
                path: path.display().to_string(),
            })
            .collect();

        let entries = parsed
            .tree
            .depth_first_all()
            .map(|entry| EntryRecord {
                id: entry.id,
                parent: entry.parent_id(),
                kind: entry.kind,
                context: entry.context.clone(),
                location: entry.instantiation,
                duration: entry.duration,
                memory_usage: entry.memory_usage,
            })
            .collect();

        Self {
            version: SCHEMA_VERSION.to_string(),
            source: source.into(),
            files,
            entries,
            generated_at: Utc::now().to_rfc3339(),
        }
    }

    /// Path of the file with `id`, if it is part of the snapshot
    pub fn file_path(&self, id: FileId) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.id == id)
            .map(|file| file.path.as_str())
    }
}
