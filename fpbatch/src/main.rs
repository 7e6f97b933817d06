//! fingerprint-batch - fingerprint a tree or list of audio files
//!
//! Runs the fingerprint tool on every discovered audio file and saves one
//! JSON record per file under the output directory. Files whose record
//! already exists are skipped, so the command can be rerun after an
//! interruption.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use fpbatch::config::CliOverrides;
use fpbatch::services::{BarProgress, Fingerprinter, LogProgress, ProgressReporter};
use fpbatch::{BatchConfig, PipelineError};
use fpbatch_common::config::TomlConfig;
use fpbatch_common::logging::{init_logging, init_logging_with_writer};

const LOG_TARGETS: &[&str] = &["fpbatch", "fingerprint_batch"];

/// Command-line arguments for fingerprint-batch
#[derive(Parser, Debug)]
#[command(name = "fingerprint-batch")]
#[command(about = "Process audio files with a fingerprint tool and save output to JSON")]
#[command(version)]
struct Args {
    /// Either a directory of audio files or a text file listing audio paths
    #[arg(short, long)]
    input: PathBuf,

    /// Directory where JSON records are saved
    #[arg(short, long = "output-dir", visible_alias = "output_dir")]
    output_dir: PathBuf,

    /// Number of parallel workers (defaults to the number of CPU cores)
    #[arg(short, long)]
    processes: Option<usize>,

    /// Fingerprint program to run
    #[arg(long)]
    tool: Option<String>,

    /// Audio extension to pick up when walking a directory (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Config file (defaults to the platform config location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log progress instead of drawing a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Write records in place instead of through a temp file
    #[arg(long)]
    allow_partial_writes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = TomlConfig::load(args.config.as_deref()).context("Failed to load config file")?;

    let cli = CliOverrides {
        processes: args.processes,
        tool: args.tool,
        extensions: args.extensions,
        atomic_writes: args.allow_partial_writes.then_some(false),
        progress_bar: args.no_progress.then_some(false),
    };
    let config = BatchConfig::resolve(args.input, args.output_dir, cli, &loaded.config)
        .context("Invalid configuration")?;

    // Log lines and the progress bar share standard error
    let level = &loaded.config.logging.level;
    let mut reporter: Box<dyn ProgressReporter> = if config.progress_bar {
        let bar = BarProgress::new();
        init_logging_with_writer(LOG_TARGETS, level, bar.log_writer());
        Box::new(bar)
    } else {
        init_logging(LOG_TARGETS, level);
        Box::new(LogProgress::default())
    };

    if let Some((path, error)) = &loaded.ignored {
        warn!(config = %path.display(), error = %error, "Ignoring unreadable config file");
    }
    if let Some(path) = &loaded.source {
        info!(config = %path.display(), "Loaded config file");
    }

    info!(
        tool = %config.tool,
        concurrency = config.concurrency.get(),
        atomic_writes = config.atomic_writes,
        "Starting fingerprint-batch {}",
        env!("CARGO_PKG_VERSION")
    );

    let (_input, scan) = match fpbatch::discover(&config) {
        Ok(found) => found,
        Err(PipelineError::Configuration(msg)) => {
            println!("Error: {}", msg);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Found {} audio files to process.", scan.files.len());
    if scan.files.is_empty() {
        println!("No audio files found. Exiting.");
        return Ok(());
    }

    let tool = Arc::new(Fingerprinter::new(&config.tool));
    let summary = fpbatch::process(&config, scan.files, tool, reporter.as_mut()).await;

    println!(
        "Processing complete. {} attempted: {} processed, {} skipped, {} failed.",
        summary.total, summary.processed, summary.skipped, summary.failed
    );

    Ok(())
}
