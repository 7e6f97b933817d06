//! Error types for the batch pipeline
//!
//! Pipeline-level errors stop a run before any work is dispatched. Item-level
//! errors are confined to the worker that hit them and surface only as
//! `ItemOutcome::Failed` events.

use crate::services::file_scanner::ScanError;
use crate::services::fingerprinter::InvocationError;
use crate::services::record_writer::WriteError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent a batch from starting
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input path missing or unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Discovery produced no candidate files
    #[error("No audio files found")]
    EmptyInput,
}

impl From<ScanError> for PipelineError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::PathNotFound(path) => PipelineError::Configuration(format!(
                "The provided input path does not exist -> {}",
                path.display()
            )),
            other => PipelineError::Configuration(other.to_string()),
        }
    }
}

/// Why a single item failed
#[derive(Debug, Error)]
pub enum ItemError {
    /// Fingerprint tool failed or could not be run
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// Record could not be persisted
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Another source already claims the same output location
    #[error("Output {output} is already claimed by {kept}")]
    OutputCollision { output: PathBuf, kept: PathBuf },
}
