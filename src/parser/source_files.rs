//! Interning of source file paths into small stable ids.
//!
//! Every `PointOfInstantiation` in a trace names a file by path. Traces
//! repeat the same handful of headers thousands of times, so paths are
//! resolved once and referred to by [`FileId`] afterwards.

use super::location::{FileId, SourceLocation};
use crate::utils::config::LOCATION_SEPARATOR;
use crate::utils::error::TraceError;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Path -> id mapping for one parse pass
///
/// Ids are handed out in first-seen order starting at 0 and are never
/// reused. The registry only grows.
#[derive(Debug, Clone, Default)]
pub struct SourceFileRegistry {
    base_dir: PathBuf,
    ids: HashMap<PathBuf, FileId>,
    paths: Vec<PathBuf>,
}

impl SourceFileRegistry {
    /// Create an empty registry resolving relative paths against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ids: HashMap::new(),
            paths: Vec::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Parse a raw `path|line|col` triple and intern its path
    ///
    /// # Errors
    /// * `TraceError::MalformedLocation` - fewer than three fields
    ///
    /// Line and column that are not unsigned integers become 0.
    pub fn add_location(&mut self, raw: &str) -> Result<SourceLocation, TraceError> {
        let mut fields = raw.trim().split(LOCATION_SEPARATOR);
        let (Some(path), Some(line), Some(column)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(TraceError::MalformedLocation {
                raw: raw.to_string(),
                offset: None,
            });
        };

        let file_id = self.intern(path)?;
        Ok(SourceLocation::new(
            file_id,
            parse_position(line, "line"),
            parse_position(column, "column"),
        ))
    }

    /// Look up or insert `path`, returning its id
    ///
    /// # Errors
    /// * `TraceError::TooManyIds` - the registry already holds `u32::MAX + 1` files
    pub fn intern(&mut self, path: impl AsRef<Path>) -> Result<FileId, TraceError> {
        let resolved = self.resolve(path.as_ref());
        if let Some(id) = self.ids.get(&resolved) {
            return Ok(*id);
        }

        let id = FileId::from_index(self.paths.len())
            .ok_or(TraceError::TooManyIds { what: "source files" })?;
        debug!("Registered source file {} as {}", resolved.display(), id);
        self.ids.insert(resolved.clone(), id);
        self.paths.push(resolved);
        Ok(id)
    }

    /// Resolved path for `id`
    pub fn path(&self, id: FileId) -> Option<&Path> {
        self.paths.get(id.index()).map(PathBuf::as_path)
    }

    /// Id of an already registered path, resolved the same way as on insert
    pub fn id_of(&self, path: impl AsRef<Path>) -> Option<FileId> {
        self.ids.get(&self.resolve(path.as_ref())).copied()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// All registered files in id order
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &Path)> + '_ {
        self.paths
            .iter()
            .zip(0u32..)
            .map(|(path, index)| (FileId(index), path.as_path()))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.base_dir.join(path))
        }
    }
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if !(last_is_normal && out.pop()) {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn parse_position(field: &str, what: &str) -> u32 {
    field.trim().parse().unwrap_or_else(|_| {
        warn!("Non-numeric {} {:?} in location, using 0", what, field);
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_dots() {
        assert_eq!(
            normalize(Path::new("/proj/src/./detail/../util.h")),
            PathBuf::from("/proj/src/util.h")
        );
        assert_eq!(normalize(Path::new("../a.h")), PathBuf::from("../a.h"));
    }

    #[test]
    fn test_ids_start_at_zero() {
        let mut registry = SourceFileRegistry::new("/proj");
        assert_eq!(registry.intern("a.h").unwrap(), FileId(0));
        assert_eq!(registry.intern("b.h").unwrap(), FileId(1));
        assert_eq!(registry.intern("./a.h").unwrap(), FileId(0));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_bad_numbers_become_zero() {
        let mut registry = SourceFileRegistry::new("/proj");
        let loc = registry.add_location("a.h|x|").unwrap();
        assert_eq!(loc.line, 0);
        assert_eq!(loc.column, 0);
    }

    #[test]
    fn test_too_few_fields() {
        let mut registry = SourceFileRegistry::new("/proj");
        let err = registry.add_location("a.h|3").unwrap_err();
        assert!(matches!(err, TraceError::MalformedLocation { offset: None, .. }));
        assert!(registry.is_empty());
    }
}
