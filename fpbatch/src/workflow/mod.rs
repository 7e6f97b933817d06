//! Batch orchestration: discovery followed by dispatch

pub mod pipeline;

pub use pipeline::Pipeline;

use crate::config::BatchConfig;
use crate::error::PipelineError;
use crate::models::{AudioFile, BatchSummary, InputSpec};
use crate::services::{FileScanner, FingerprintTool, ProgressReporter, ScanResult};
use std::sync::Arc;

/// Discover the candidate files for `config.input`
///
/// A missing input path is a configuration error; an empty result is
/// returned as-is so the caller can report it.
pub fn discover(config: &BatchConfig) -> Result<(InputSpec, ScanResult), PipelineError> {
    let input = InputSpec::detect(&config.input)?;
    let scanner = FileScanner::new(&config.extensions);
    let result = scanner.discover(&input)?;

    tracing::info!(
        input = %input.path().display(),
        mode = if input.is_directory() { "directory" } else { "list" },
        files = result.files.len(),
        "Found audio files"
    );

    Ok((input, result))
}

/// Discover and process a whole batch
///
/// Returns `EmptyInput` without dispatching anything when discovery finds no
/// files.
pub async fn run_batch(
    config: &BatchConfig,
    tool: Arc<dyn FingerprintTool>,
    reporter: &mut dyn ProgressReporter,
) -> Result<BatchSummary, PipelineError> {
    let (_input, scan) = discover(config)?;
    if scan.files.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    Ok(process(config, scan.files, tool, reporter).await)
}

/// Process already discovered files with the pipeline `config` describes
pub async fn process(
    config: &BatchConfig,
    files: Vec<AudioFile>,
    tool: Arc<dyn FingerprintTool>,
    reporter: &mut dyn ProgressReporter,
) -> BatchSummary {
    Pipeline::from_config(config, tool).run(files, reporter).await
}
