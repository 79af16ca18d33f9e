//! Configuration and constants for the trace reader and CLI.

use std::path::{Path, PathBuf};

/// Current snapshot schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Element names of the Templight XML trace format
pub const TEMPLATE_BEGIN_TAG: &str = "TemplateBegin";
pub const TEMPLATE_END_TAG: &str = "TemplateEnd";
pub const POSITION_TAG: &str = "PointOfInstantiation";
pub const CONTEXT_TAG: &str = "Context";
pub const KIND_TAG: &str = "Kind";
pub const TIMESTAMP_TAG: &str = "TimeStamp";
pub const MEMORY_TAG: &str = "MemoryUsage";

// Attribute names carried by the elements above
pub const CONTEXT_ATTR: &str = "context";
pub const TIME_ATTR: &str = "time";
pub const BYTES_ATTR: &str = "bytes";

/// Separator between the fields of a `path|line|col` position
pub const LOCATION_SEPARATOR: char = '|';

/// Columns exposed by the list model: context, kind, duration, memory
pub const MODEL_COLUMN_COUNT: usize = 4;

/// Options for a single trace read
#[derive(Debug, Clone, Default)]
pub struct TraceReaderConfig {
    /// Directory relative source paths are resolved against.
    /// `None` means the directory containing the trace file.
    pub base_dir: Option<PathBuf>,
}

impl TraceReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Base directory to use for a trace stored at `trace_path`
    pub fn resolve_base_dir(&self, trace_path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.clone(),
            None => trace_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}
