//! Fingerprint tool invocation
//!
//! Runs the external fingerprinting program (`fpcalc` by default) once per
//! file as `<tool> <absolute_audio_path>` and turns its `key=value` output
//! into a [`FingerprintRecord`] stamped with the source path.

use async_trait::async_trait;
use fpbatch_common::FingerprintRecord;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;

/// Invocation errors
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Tool ran and exited non-zero
    #[error("Fingerprint tool failed (exit code {status:?}): {stderr}")]
    ToolFailure { status: Option<i32>, stderr: String },

    /// Tool could not be run or its output could not be read
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Produces a fingerprint record for one audio file
#[async_trait]
pub trait FingerprintTool: Send + Sync {
    /// Fingerprint `audio_path`, returning the record with provenance set
    async fn fingerprint(&self, audio_path: &Path) -> Result<FingerprintRecord, InvocationError>;
}

/// External fingerprint program
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    program: PathBuf,
}

impl Fingerprinter {
    /// Fingerprinter running `program` (looked up in PATH if bare)
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run the program and wait for it (blocking)
    pub fn fingerprint_blocking(
        program: &Path,
        audio_path: &Path,
    ) -> Result<FingerprintRecord, InvocationError> {
        let output = Command::new(program).arg(audio_path).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                InvocationError::Unexpected(format!(
                    "fingerprint tool not found: {}",
                    program.display()
                ))
            } else {
                InvocationError::Unexpected(format!(
                    "failed to run {}: {}",
                    program.display(),
                    e
                ))
            }
        })?;

        Self::parse_output(output, audio_path)
    }

    /// Turn process output into a record
    ///
    /// Non-zero exit → `ToolFailure` with captured stderr. On success stdout
    /// must be UTF-8; it is parsed line by line and the provenance key is set
    /// to `audio_path`, overriding anything the tool printed under that name.
    pub fn parse_output(output: Output, audio_path: &Path) -> Result<FingerprintRecord, InvocationError> {
        if !output.status.success() {
            return Err(InvocationError::ToolFailure {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            InvocationError::Unexpected(format!("tool output is not valid UTF-8: {}", e))
        })?;

        let mut record = FingerprintRecord::parse_key_values(&stdout);
        record.set_provenance(audio_path);
        Ok(record)
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(fpbatch_common::config::CompiledDefaults::TOOL)
    }
}

#[async_trait]
impl FingerprintTool for Fingerprinter {
    async fn fingerprint(&self, audio_path: &Path) -> Result<FingerprintRecord, InvocationError> {
        tracing::debug!(file = %audio_path.display(), tool = %self.program.display(), "Running fingerprint tool");

        // Blocking process wait runs off the async workers
        let program = self.program.clone();
        let audio = audio_path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::fingerprint_blocking(&program, &audio))
            .await
            .map_err(|e| InvocationError::Unexpected(format!("Task join error: {}", e)))?
    }
}
