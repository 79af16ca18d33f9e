//! Commands that read a trace: inspect, files, dump.
//!
//! Each command:
//! 1. Validates its arguments
//! 2. Reads the trace (fully, or locations only)
//! 3. Prints or writes the result

use super::models::{DumpArgs, InspectArgs, TraceArgs};
use crate::output::write_snapshot;
use crate::parser::{
    parse_trace_file, read_source_files, ParsedTrace, SourceFileRegistry, SourceLocation,
    TraceSnapshot,
};
use crate::tree::{walk_tree, EntryRef, EntryVisitor};
use crate::utils::config::TraceReaderConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Print the instantiation tree of a trace
///
/// **Public** - main entry point called from main.rs
pub fn execute_inspect(args: InspectArgs) -> Result<()> {
    let start_time = Instant::now();
    let parsed = read_trace(&args.trace)?;

    print!(
        "{}",
        render_tree(&parsed, args.max_depth, args.show_paths)
    );

    debug!(
        "Inspect completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// List the source files a trace refers to, without building the tree
pub fn execute_files(args: TraceArgs) -> Result<()> {
    validate_args(&args)?;

    let files = read_source_files(&args.trace_file, &reader_config(&args)).with_context(|| {
        format!(
            "Failed to scan source files of {}",
            args.trace_file.display()
        )
    })?;

    print!("{}", render_files(&files));
    Ok(())
}

/// Write a JSON snapshot of a trace
pub fn execute_dump(args: DumpArgs) -> Result<()> {
    let parsed = read_trace(&args.trace)?;

    let snapshot = TraceSnapshot::from_parsed(&parsed, args.trace.trace_file.display().to_string());
    write_snapshot(&snapshot, &args.output_json).context("Failed to write snapshot JSON")?;

    info!(
        "✓ Snapshot with {} entries written to: {}",
        snapshot.entries.len(),
        args.output_json.display()
    );
    Ok(())
}

/// Validate trace arguments
///
/// **Public** - can be called before any command for early validation
pub fn validate_args(args: &TraceArgs) -> Result<()> {
    if args.trace_file.as_os_str().is_empty() {
        anyhow::bail!("Trace file path cannot be empty");
    }

    if args.trace_file.is_dir() {
        anyhow::bail!(
            "Trace file path is a directory: {}",
            args.trace_file.display()
        );
    }

    if let Some(base_dir) = &args.base_dir {
        if !base_dir.is_dir() {
            anyhow::bail!("Base directory does not exist: {}", base_dir.display());
        }
    }

    Ok(())
}

/// Render the tree as indented text, one entry per line
///
/// Every top-level entry starts at depth 0.
pub fn render_tree(parsed: &ParsedTrace, max_depth: Option<usize>, show_paths: bool) -> String {
    let mut printer = TreePrinter {
        files: &parsed.files,
        max_depth,
        show_paths,
        out: String::new(),
    };

    for top in parsed.tree.top_level() {
        printer.line(0, top);
        walk_tree(top, 0, &mut printer);
    }

    printer.out
}

/// Render the registry as `id  path` lines
pub fn render_files(files: &SourceFileRegistry) -> String {
    let mut out = String::new();
    for (id, path) in files.iter() {
        out.push_str(&format!("{:>5}  {}\n", id.0, path.display()));
    }
    out
}

fn read_trace(args: &TraceArgs) -> Result<ParsedTrace> {
    validate_args(args)?;

    let parsed = parse_trace_file(&args.trace_file, &reader_config(args))
        .with_context(|| format!("Failed to read trace {}", args.trace_file.display()))?;

    debug!(
        "Parsed trace: {} entries, {} source files",
        parsed.tree.len(),
        parsed.files.len()
    );
    Ok(parsed)
}

fn reader_config(args: &TraceArgs) -> TraceReaderConfig {
    match &args.base_dir {
        Some(dir) => TraceReaderConfig::new().with_base_dir(dir),
        None => TraceReaderConfig::new(),
    }
}

/// Visitor carrying the depth of each node
struct TreePrinter<'f> {
    files: &'f SourceFileRegistry,
    max_depth: Option<usize>,
    show_paths: bool,
    out: String,
}

impl TreePrinter<'_> {
    fn line(&mut self, depth: usize, entry: EntryRef<'_>) {
        if self.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        self.out.push_str(&format!(
            "{}{} [{}] {:.3} ms, {} B",
            "  ".repeat(depth),
            entry.context,
            entry.kind,
            entry.duration * 1000.0,
            entry.memory_usage
        ));
        if let Some(location) = entry.instantiation {
            let location = self.location(location);
            self.out.push_str(&format!(" @ {}", location));
        }
        self.out.push('\n');
    }

    fn location(&self, location: SourceLocation) -> String {
        match self.files.path(location.file_id) {
            Some(path) if self.show_paths => {
                format!("{}:{}:{}", path.display(), location.line, location.column)
            }
            _ => location.to_string(),
        }
    }
}

impl EntryVisitor for TreePrinter<'_> {
    type State = usize;

    fn visit(&mut self, depth: &usize, _parent: EntryRef<'_>, child: EntryRef<'_>) -> usize {
        let child_depth = depth + 1;
        self.line(child_depth, child);
        child_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TraceReader;

    const TRACE: &str = r#"<Trace>
<TemplateBegin><Kind>TemplateInstantiation</Kind><Context context="A"/><PointOfInstantiation>main.cpp|4|2</PointOfInstantiation><TimeStamp time="0"/></TemplateBegin>
<TemplateBegin><Kind>Memoization</Kind><Context context="B"/><TimeStamp time="0"/></TemplateBegin>
<TemplateEnd><TimeStamp time="0.001"/><MemoryUsage bytes="8"/></TemplateEnd>
<TemplateEnd><TimeStamp time="0.002"/><MemoryUsage bytes="16"/></TemplateEnd>
</Trace>"#;

    #[test]
    fn test_render_tree_indents_children() {
        let parsed = TraceReader::new("/src").read(TRACE.as_bytes()).unwrap();
        let text = render_tree(&parsed, None, true);

        assert_eq!(
            text,
            "A [TemplateInstantiation] 2.000 ms, 16 B @ /src/main.cpp:4:2\n  B [Memoization] 1.000 ms, 8 B\n"
        );
    }

    #[test]
    fn test_render_tree_respects_max_depth() {
        let parsed = TraceReader::new("/src").read(TRACE.as_bytes()).unwrap();
        let text = render_tree(&parsed, Some(0), false);

        assert_eq!(text, "A [TemplateInstantiation] 2.000 ms, 16 B @ #0:4:2\n");
    }

    #[test]
    fn test_render_tree_prints_every_top_level_entry() {
        let xml = r#"<TemplateBegin><Context context="first"/></TemplateBegin>
<TemplateBegin><Context context="nested"/></TemplateBegin><TemplateEnd/>
<TemplateEnd/>
<TemplateBegin><Context context="second"/></TemplateBegin><TemplateEnd/>"#;
        let parsed = TraceReader::new("/src").read(xml.as_bytes()).unwrap();

        assert_eq!(
            render_tree(&parsed, None, false),
            "first [Unknown] 0.000 ms, 0 B
  nested [Unknown] 0.000 ms, 0 B
second [Unknown] 0.000 ms, 0 B
"
        );
    }
}
