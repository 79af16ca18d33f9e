use std::path::PathBuf;

/// Arguments shared by the commands that read a trace
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct TraceArgs {
    /// Trace XML file
    pub trace_file: PathBuf,

    /// Directory relative source paths are resolved against
    pub base_dir: Option<PathBuf>,
}

/// Arguments for the inspect command
#[derive(Debug, Clone)]
pub struct InspectArgs {
    pub trace: TraceArgs,

    /// Deepest level to print (root is 0); `None` prints everything
    pub max_depth: Option<usize>,

    /// Print resolved file paths instead of file ids
    pub show_paths: bool,
}

/// Arguments for the dump command
#[derive(Debug, Clone)]
pub struct DumpArgs {
    pub trace: TraceArgs,

    /// Output path for the JSON snapshot
    pub output_json: PathBuf,
}

impl Default for TraceArgs {
    fn default() -> Self {
        Self {
            trace_file: PathBuf::from("trace.xml"),
            base_dir: None,
        }
    }
}

impl Default for InspectArgs {
    fn default() -> Self {
        Self {
            trace: TraceArgs::default(),
            max_depth: None,
            show_paths: false,
        }
    }
}

impl Default for DumpArgs {
    fn default() -> Self {
        Self {
            trace: TraceArgs::default(),
            output_json: PathBuf::from("tree.json"),
        }
    }
}
