//! Snapshot files on disk.
//!
//! A snapshot is written as one pretty-printed JSON document followed by a
//! newline. Loading goes through the same [`TraceSnapshot`] serde model, so
//! a file written here always reads back.

use crate::parser::schema::TraceSnapshot;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Serialize a snapshot to the exact text [`write_snapshot`] puts on disk
pub fn snapshot_to_string(snapshot: &TraceSnapshot) -> Result<String, OutputError> {
    let mut json = serde_json::to_string_pretty(snapshot)?;
    json.push('\n');
    Ok(json)
}

/// Write a snapshot, creating missing parent directories
///
/// # Errors
/// * `OutputError::InvalidPath` - empty path or an existing directory
/// * `OutputError::SerializationFailed` - the snapshot cannot be encoded
/// * `OutputError::WriteFailed` - a directory or the file cannot be written
pub fn write_snapshot(
    snapshot: &TraceSnapshot,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    if output_path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }
    if output_path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "{} is a directory",
            output_path.display()
        )));
    }

    let json = snapshot_to_string(snapshot)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::WriteFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(output_path, &json).map_err(|source| OutputError::WriteFailed {
        path: output_path.to_path_buf(),
        source,
    })?;

    info!(
        "Snapshot written to {} ({} bytes)",
        output_path.display(),
        json.len()
    );
    Ok(())
}

/// Load a snapshot written by [`write_snapshot`]
///
/// # Errors
/// * `OutputError::ReadFailed` - the file cannot be read
/// * `OutputError::ParseFailed` - the content is not a snapshot
pub fn read_snapshot(input_path: impl AsRef<Path>) -> Result<TraceSnapshot, OutputError> {
    let input_path = input_path.as_ref();

    let json = fs::read_to_string(input_path).map_err(|source| OutputError::ReadFailed {
        path: input_path.to_path_buf(),
        source,
    })?;

    let snapshot: TraceSnapshot =
        serde_json::from_str(&json).map_err(|source| OutputError::ParseFailed {
            path: input_path.to_path_buf(),
            source,
        })?;

    debug!(
        "Loaded snapshot {} (schema {}, {} entries)",
        input_path.display(),
        snapshot.version,
        snapshot.entries.len()
    );
    Ok(snapshot)
}
