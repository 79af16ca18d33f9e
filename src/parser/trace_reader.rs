//! Streaming reader for Templight XML traces.
//!
//! The trace is a flat sequence of `TemplateBegin` / `TemplateEnd` blocks.
//! Nesting is recovered with an explicit stack: a begin block opens an
//! entry under the current stack top, the matching end block pops it,
//! finalizes its duration and memory usage, and appends it to its parent.
//!
//! ```text
//! <TemplateBegin>
//!     <Kind>TemplateInstantiation</Kind>
//!     <Context context="std::vector<int>"/>
//!     <PointOfInstantiation>main.cpp|12|5</PointOfInstantiation>
//!     <TimeStamp time="0.125"/>
//! </TemplateBegin>
//! <TemplateEnd>
//!     <TimeStamp time="0.250"/>
//!     <MemoryUsage bytes="4096"/>
//! </TemplateEnd>
//! ```

use super::kind::EntryKind;
use super::location::SourceLocation;
use super::source_files::SourceFileRegistry;
use super::xml_events::{Marker, TagStream, XmlEvent};
use crate::tree::{EntryId, TraceTree};
use crate::utils::config::TraceReaderConfig;
use crate::utils::error::TraceError;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Result of a full read: the call tree and the files it references
#[derive(Debug, Clone)]
pub struct ParsedTrace {
    pub tree: TraceTree,
    pub files: SourceFileRegistry,
}

/// Fields collected from one `TemplateBegin` block
#[derive(Debug, Default)]
struct BeginBlock {
    context: Option<String>,
    location: Option<SourceLocation>,
    kind: Option<EntryKind>,
    time: Option<f64>,
}

/// Fields collected from one `TemplateEnd` block
#[derive(Debug, Default)]
struct EndBlock {
    memory: Option<i64>,
    time: Option<f64>,
}

/// An entry whose end block has not been seen yet
#[derive(Debug)]
struct OpenEntry {
    id: EntryId,
    begin_time: f64,
}

/// Reader for one trace stream
#[derive(Debug, Clone)]
pub struct TraceReader {
    base_dir: PathBuf,
}

impl TraceReader {
    /// Create a reader resolving relative source paths against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Rebuild the instantiation tree from `input`
    ///
    /// # Errors
    /// * `TraceError::MalformedLocation` - a position with fewer than 3 fields
    /// * `TraceError::MalformedTrace` - invalid XML, unbalanced or unterminated
    ///   blocks, or no entries at all
    /// * `TraceError::TooManyIds` - more entries or files than 32-bit ids allow
    pub fn read<R: BufRead>(&self, input: R) -> Result<ParsedTrace, TraceError> {
        let mut events = TagStream::new(input);
        let mut files = SourceFileRegistry::new(&self.base_dir);
        let mut tree = TraceTree::new();
        let mut stack: Vec<OpenEntry> = Vec::new();

        loop {
            match events.next_event()? {
                XmlEvent::Open {
                    marker: Marker::TemplateBegin,
                    self_closing,
                    ..
                } => {
                    let block = if self_closing {
                        BeginBlock::default()
                    } else {
                        scan_begin_block(&mut events, &mut files)?
                    };

                    let id = tree.open(stack.last().map(|open| open.id))?;
                    let entry = tree.entry_mut(id);
                    entry.kind = block.kind.unwrap_or_default();
                    entry.context = block.context.unwrap_or_default();
                    if let Some(location) = block.location {
                        entry.set_instantiation(location);
                    }

                    stack.push(OpenEntry {
                        id,
                        begin_time: block.time.unwrap_or(0.0),
                    });
                }
                XmlEvent::Open {
                    marker: Marker::TemplateEnd,
                    self_closing,
                    ..
                } => {
                    let offset = events.offset();
                    let open = stack.pop().ok_or_else(|| {
                        TraceError::malformed(offset, "TemplateEnd without a matching TemplateBegin")
                    })?;

                    let block = if self_closing {
                        EndBlock::default()
                    } else {
                        scan_end_block(&mut events)?
                    };

                    let entry = tree.entry_mut(open.id);
                    entry.memory_usage = block.memory.unwrap_or(0);
                    entry.duration = match block.time {
                        Some(end_time) => end_time - open.begin_time,
                        None => {
                            debug!("Entry {} has no end timestamp, duration left at 0", open.id);
                            0.0
                        }
                    };
                    tree.attach(open.id);
                }
                XmlEvent::Eof => break,
                _ => {}
            }
        }

        if let Some(innermost) = stack.last() {
            return Err(TraceError::malformed(
                events.offset(),
                format!(
                    "input ended with {} unclosed TemplateBegin block(s), innermost is entry {}",
                    stack.len(),
                    innermost.id
                ),
            ));
        }

        let top_level = tree.top_level().len();
        if top_level == 0 {
            return Err(TraceError::malformed(
                events.offset(),
                "trace contains no TemplateBegin/TemplateEnd pair",
            ));
        }
        if top_level > 1 {
            warn!(
                "Trace has {} top-level entries instead of one",
                top_level
            );
        }

        info!(
            "Read {} entries referencing {} source files",
            tree.len(),
            files.len()
        );

        Ok(ParsedTrace { tree, files })
    }

    /// Collect only the source files referenced by begin blocks, without
    /// building a tree
    pub fn read_locations<R: BufRead>(&self, input: R) -> Result<SourceFileRegistry, TraceError> {
        let mut events = TagStream::new(input);
        let mut files = SourceFileRegistry::new(&self.base_dir);

        loop {
            match events.next_event()? {
                XmlEvent::Open {
                    marker: Marker::TemplateBegin,
                    self_closing: false,
                    ..
                } => {
                    scan_begin_block(&mut events, &mut files)?;
                }
                XmlEvent::Eof => break,
                _ => {}
            }
        }

        debug!("Found {} referenced source files", files.len());
        Ok(files)
    }
}

/// Open and read a trace file
///
/// **Public** - main entry point for reading traces
///
/// Relative source paths resolve against `config.base_dir`, or the directory
/// containing `path` when none is set.
///
/// # Errors
/// * `TraceError::FileOpen` - the file cannot be opened
/// * everything [`TraceReader::read`] can return
pub fn parse_trace_file(
    path: impl AsRef<Path>,
    config: &TraceReaderConfig,
) -> Result<ParsedTrace, TraceError> {
    let path = path.as_ref();
    info!("Reading trace: {}", path.display());
    let input = open_trace(path)?;
    TraceReader::new(config.resolve_base_dir(path)).read(input)
}

/// Open a trace file and list the source files it references
///
/// **Public** - lighter entry point for path-resolution views
pub fn read_source_files(
    path: impl AsRef<Path>,
    config: &TraceReaderConfig,
) -> Result<SourceFileRegistry, TraceError> {
    let path = path.as_ref();
    debug!("Scanning trace for source files: {}", path.display());
    let input = open_trace(path)?;
    TraceReader::new(config.resolve_base_dir(path)).read_locations(input)
}

fn open_trace(path: &Path) -> Result<BufReader<File>, TraceError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TraceError::FileOpen {
            path: path.to_path_buf(),
            source,
        })
}

/// Consume a begin block up to and including `</TemplateBegin>`
fn scan_begin_block<R: BufRead>(
    events: &mut TagStream<R>,
    files: &mut SourceFileRegistry,
) -> Result<BeginBlock, TraceError> {
    let mut block = BeginBlock::default();

    loop {
        match events.next_event()? {
            XmlEvent::Open {
                marker: Marker::Context,
                value,
                ..
            } => block.context = value,
            XmlEvent::Open {
                marker: Marker::Position,
                self_closing,
                ..
            } => {
                let offset = events.offset();
                let raw = if self_closing {
                    String::new()
                } else {
                    events.read_text(Marker::Position)?
                };
                let location = files
                    .add_location(&raw)
                    .map_err(|e| e.at_offset(offset))?;
                block.location = Some(location);
            }
            XmlEvent::Open {
                marker: Marker::Kind,
                self_closing,
                ..
            } => {
                let text = if self_closing {
                    String::new()
                } else {
                    events.read_text(Marker::Kind)?
                };
                let kind: EntryKind = text.parse().unwrap_or_default();
                if kind == EntryKind::Unknown {
                    debug!("Unrecognized instantiation kind {:?}", text.trim());
                }
                block.kind = Some(kind);
            }
            XmlEvent::Open {
                marker: Marker::TimeStamp,
                value,
                ..
            } => block.time = Some(parse_number(value.as_deref(), "time")),
            XmlEvent::Open {
                marker: marker @ (Marker::TemplateBegin | Marker::TemplateEnd),
                ..
            } => return Err(nested_block(events.offset(), marker, Marker::TemplateBegin)),
            XmlEvent::Close(Marker::TemplateBegin) => return Ok(block),
            XmlEvent::Eof => return Err(unterminated(events.offset(), Marker::TemplateBegin)),
            _ => {}
        }
    }
}

/// Consume an end block up to and including `</TemplateEnd>`
fn scan_end_block<R: BufRead>(events: &mut TagStream<R>) -> Result<EndBlock, TraceError> {
    let mut block = EndBlock::default();

    loop {
        match events.next_event()? {
            XmlEvent::Open {
                marker: Marker::Memory,
                value,
                ..
            } => block.memory = Some(parse_number(value.as_deref(), "bytes")),
            XmlEvent::Open {
                marker: Marker::TimeStamp,
                value,
                ..
            } => block.time = Some(parse_number(value.as_deref(), "time")),
            XmlEvent::Open {
                marker: marker @ (Marker::TemplateBegin | Marker::TemplateEnd),
                ..
            } => return Err(nested_block(events.offset(), marker, Marker::TemplateEnd)),
            XmlEvent::Close(Marker::TemplateEnd) => return Ok(block),
            XmlEvent::Eof => return Err(unterminated(events.offset(), Marker::TemplateEnd)),
            _ => {}
        }
    }
}

/// Numeric attribute values are parsed leniently: garbage reads as 0
fn parse_number<T>(value: Option<&str>, attribute: &str) -> T
where
    T: std::str::FromStr + Default,
{
    let Some(raw) = value else {
        warn!("Missing `{}` attribute, using 0", attribute);
        return T::default();
    };
    raw.trim().parse().unwrap_or_else(|_| {
        warn!("Invalid `{}` value {:?}, using 0", attribute, raw);
        T::default()
    })
}

fn nested_block(offset: u64, found: Marker, inside: Marker) -> TraceError {
    TraceError::malformed(
        offset,
        format!("<{}> opened inside <{}>", found.tag(), inside.tag()),
    )
}

fn unterminated(offset: u64, marker: Marker) -> TraceError {
    TraceError::malformed(
        offset,
        format!("input ended before </{}>", marker.tag()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(xml: &str) -> Result<ParsedTrace, TraceError> {
        TraceReader::new("/proj/src").read(xml.as_bytes())
    }

    #[test]
    fn test_single_entry_fields() {
        let parsed = read(
            r#"<Trace>
<TemplateBegin>
    <Kind>TemplateInstantiation</Kind>
    <Context context="Foo&lt;int&gt;"/>
    <PointOfInstantiation>util.h|10|4</PointOfInstantiation>
    <TimeStamp time="1.5"/>
    <MemoryUsage bytes="7"/>
</TemplateBegin>
<TemplateEnd>
    <Kind>TemplateInstantiation</Kind>
    <TimeStamp time="2.0"/>
    <MemoryUsage bytes="4096"/>
</TemplateEnd>
</Trace>"#,
        )
        .unwrap();

        let root = parsed.tree.root();
        assert_eq!(root.kind, EntryKind::TemplateInstantiation);
        assert_eq!(root.context, "Foo<int>");
        assert_eq!(root.duration, 0.5);
        assert_eq!(root.memory_usage, 4096);

        let location = root.instantiation.unwrap();
        assert_eq!((location.line, location.column), (10, 4));
        assert_eq!(
            parsed.files.path(location.file_id),
            Some(Path::new("/proj/src/util.h"))
        );
    }

    #[test]
    fn test_missing_end_timestamp_gives_zero_duration() {
        let parsed = read(
            r#"<TemplateBegin><TimeStamp time="3.0"/></TemplateBegin><TemplateEnd></TemplateEnd>"#,
        )
        .unwrap();
        assert_eq!(parsed.tree.root().duration, 0.0);
    }

    #[test]
    fn test_garbage_numbers_read_as_zero() {
        let parsed = read(
            r#"<TemplateBegin><TimeStamp time="soon"/></TemplateBegin>
<TemplateEnd><TimeStamp time="2.5"/><MemoryUsage bytes="lots"/></TemplateEnd>"#,
        )
        .unwrap();
        let root = parsed.tree.root();
        assert_eq!(root.duration, 2.5);
        assert_eq!(root.memory_usage, 0);
    }

    #[test]
    fn test_unmatched_end_is_malformed() {
        let err = read("<TemplateEnd/>").unwrap_err();
        assert!(matches!(err, TraceError::MalformedTrace { .. }));
    }

    #[test]
    fn test_nested_begin_inside_block_is_malformed() {
        let err = read("<TemplateBegin><TemplateBegin></TemplateBegin></TemplateBegin>").unwrap_err();
        assert!(matches!(err, TraceError::MalformedTrace { .. }));
    }

    #[test]
    fn test_empty_trace_is_malformed() {
        let err = read("<Trace></Trace>").unwrap_err();
        assert!(matches!(err, TraceError::MalformedTrace { .. }));
    }

    #[test]
    fn test_location_error_carries_offset() {
        let err = read(
            "<TemplateBegin><PointOfInstantiation>util.h|10</PointOfInstantiation></TemplateBegin>",
        )
        .unwrap_err();
        match err {
            TraceError::MalformedLocation { raw, offset } => {
                assert_eq!(raw, "util.h|10");
                assert!(offset.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
