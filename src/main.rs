//! Templar Trace CLI
//!
//! Reads Templight template-instantiation traces and shows the
//! reconstructed instantiation tree.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use templar_trace::commands::{
    display_version, execute_dump, execute_files, execute_inspect, validate_snapshot_file,
    DumpArgs, InspectArgs, TraceArgs,
};

/// Templar Trace - template instantiation trees from Templight traces
#[derive(Parser, Debug)]
#[command(name = "templar")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Trace input options shared by several commands
#[derive(Args, Debug)]
struct TraceInput {
    /// Templight XML trace file
    #[arg(short, long)]
    file: PathBuf,

    /// Resolve relative source paths against this directory
    /// (defaults to the trace file's directory)
    #[arg(long, env = "TEMPLAR_BASE_DIR")]
    base_dir: Option<PathBuf>,
}

impl From<TraceInput> for TraceArgs {
    fn from(input: TraceInput) -> Self {
        Self {
            trace_file: input.file,
            base_dir: input.base_dir,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the instantiation tree of a trace
    Inspect {
        #[command(flatten)]
        input: TraceInput,

        /// Deepest level to print (root is 0)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Show resolved source paths instead of file ids
        #[arg(long)]
        paths: bool,
    },

    /// List the source files referenced by a trace
    Files {
        #[command(flatten)]
        input: TraceInput,
    },

    /// Write the tree as a JSON snapshot
    Dump {
        #[command(flatten)]
        input: TraceInput,

        /// Output path for the JSON snapshot
        #[arg(short, long, default_value = "tree.json")]
        output: PathBuf,
    },

    /// Validate a snapshot JSON file
    Validate {
        /// Path to snapshot JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Inspect {
            input,
            max_depth,
            paths,
        } => {
            execute_inspect(InspectArgs {
                trace: input.into(),
                max_depth,
                show_paths: paths,
            })?;
        }

        Commands::Files { input } => {
            execute_files(input.into())?;
        }

        Commands::Dump { input, output } => {
            execute_dump(DumpArgs {
                trace: input.into(),
                output_json: output,
            })?;
        }

        Commands::Validate { file } => {
            validate_snapshot_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
