//! fingerprint-collect - merge a record tree into one JSON Lines file
//!
//! Every record is tagged with the path it was read from. Records that fail
//! to parse are reported and left out.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fpbatch::services::Aggregator;
use fpbatch_common::config::CompiledDefaults;

/// Command-line arguments for fingerprint-collect
#[derive(Parser, Debug)]
#[command(name = "fingerprint-collect")]
#[command(about = "Concatenate fingerprint JSON records into a JSON Lines file")]
#[command(version)]
struct Args {
    /// Root directory of the record tree
    #[arg(short, long = "input-dir", visible_alias = "input_json_parent_dir")]
    input_dir: PathBuf,

    /// JSON Lines file to write
    #[arg(short, long, visible_alias = "output_jsonl_path")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    fpbatch_common::logging::init_logging(
        &["fpbatch", "fingerprint_collect"],
        CompiledDefaults::LOG_LEVEL,
    );

    let aggregator = Aggregator::default();
    let summary = aggregator
        .collect(&args.input_dir, &args.output)
        .with_context(|| format!("Failed to aggregate records in {}", args.input_dir.display()))?;

    println!(
        "Found {} json files in {}",
        summary.found,
        args.input_dir.display()
    );
    println!("Saved {} items to {}", summary.written, args.output.display());
    if summary.skipped > 0 {
        println!("Skipped {} unreadable records", summary.skipped);
    }

    Ok(())
}
