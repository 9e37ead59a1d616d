//! CLI inspection entry point.
//!
//! # Responsibility
//! - Report the core and schema versions.
//! - Load a tree file given on the command line and print a summary.
//! - Start file logging when a log directory is given.

use clap::Parser;
use famtree_core::{CodecOptions, TreeCodec};
use std::path::PathBuf;
use std::process::ExitCode;

/// Inspect family tree files.
#[derive(Debug, Parser)]
#[command(name = "famtree_cli", version, about, long_about = None)]
struct Cli {
    /// Load files written by a newer version instead of rejecting them
    #[arg(long)]
    ignore_version: bool,

    /// Absolute directory for rolling log files
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Tree file to load and summarize
    #[arg(value_name = "TREE_FILE")]
    path: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(dir) = &cli.log_dir {
        let Some(dir) = dir.to_str() else {
            eprintln!("log directory `{}` is not valid UTF-8", dir.display());
            return ExitCode::from(2);
        };
        if let Err(err) = famtree_core::init_logging(famtree_core::default_log_level(), dir) {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    }

    println!("famtree_core version={}", famtree_core::core_version());
    println!("famtree_core schema={}", famtree_core::schema_version());

    let Some(path) = cli.path else {
        return ExitCode::SUCCESS;
    };

    let options = CodecOptions {
        ignore_version: cli.ignore_version,
    };
    match TreeCodec::new(options).load_file(&path) {
        Ok(loaded) => {
            println!("tree name={}", loaded.graph.name());
            println!("tree file_version={}", loaded.version);
            println!("tree members={}", loaded.graph.member_count());
            println!("tree unions={}", loaded.graph.union_count());
            println!("tree cards={}", loaded.view.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to load `{}`: {err}", path.display());
            ExitCode::FAILURE
        }
    }
}
