use crate::output::read_snapshot;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a snapshot JSON file
pub fn validate_snapshot_file(file_path: PathBuf) -> Result<()> {
    println!("Validating snapshot: {}", file_path.display());

    let snapshot = read_snapshot(&file_path)?;

    if snapshot.version != SCHEMA_VERSION {
        anyhow::bail!(
            "Unsupported snapshot version {} (expected {})",
            snapshot.version,
            SCHEMA_VERSION
        );
    }

    if let Some(orphan) = snapshot.entries.iter().find(|entry| {
        entry
            .parent
            .is_some_and(|parent| !snapshot.entries.iter().any(|other| other.id == parent))
    }) {
        anyhow::bail!("Entry {} refers to a missing parent", orphan.id);
    }

    println!("✓ Valid snapshot JSON");
    println!("  Version: {}", snapshot.version);
    println!("  Source: {}", snapshot.source);
    println!("  Entries: {}", snapshot.entries.len());
    println!("  Source Files: {}", snapshot.files.len());
    println!("  Generated: {}", snapshot.generated_at);

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Templar Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Snapshot Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Rebuilds template-instantiation trees from Templight XML traces.");
}
