//! Record aggregation
//!
//! Walks a tree of record files, tags each record with the path it was read
//! from and writes all of them to one JSON Lines file. A record that fails to
//! load is logged and left out; it never stops the aggregation.

use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Key added to every aggregated record, holding its file path
pub const LOCATION_KEY: &str = "PATH";

/// Aggregation errors
#[derive(Debug, Error)]
pub enum AggregationError {
    /// Input directory does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// One record could not be read or parsed
    #[error("Failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// Output could not be written
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Aggregation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    /// Record files found
    pub found: usize,
    /// Records written to the output
    pub written: usize,
    /// Records skipped because they failed to load
    pub skipped: usize,
}

/// Record aggregator
#[derive(Debug, Clone)]
pub struct Aggregator {
    record_extension: String,
}

impl Aggregator {
    pub fn new(record_extension: impl Into<String>) -> Self {
        Self {
            record_extension: record_extension.into(),
        }
    }

    /// Find record files below `root`, sorted by path
    pub fn find_records(&self, root: &Path) -> Result<Vec<PathBuf>, AggregationError> {
        if !root.is_dir() {
            return Err(AggregationError::PathNotFound(root.to_path_buf()));
        }

        let suffix = format!(".{}", self.record_extension);
        let mut records: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    tracing::warn!("Error walking directory: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with(&suffix))
            .map(|e| e.into_path())
            .collect();

        records.sort();
        Ok(records)
    }

    /// Load one record and tag it with its location
    ///
    /// Any JSON object is accepted; the location key replaces a field of the
    /// same name.
    pub fn load_record(path: &Path) -> Result<Map<String, Value>, AggregationError> {
        let load_err = |message: String| AggregationError::Load {
            path: path.to_path_buf(),
            message,
        };

        let bytes = std::fs::read(path).map_err(|e| load_err(e.to_string()))?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| load_err(e.to_string()))?;
        let Value::Object(mut fields) = value else {
            return Err(load_err("not a JSON object".to_string()));
        };

        fields.insert(
            LOCATION_KEY.to_string(),
            Value::String(path.to_string_lossy().into_owned()),
        );
        Ok(fields)
    }

    /// Aggregate every record below `root` into `output` (one per line)
    pub fn collect(&self, root: &Path, output: &Path) -> Result<AggregationSummary, AggregationError> {
        let records = self.find_records(root)?;
        tracing::info!(
            input = %root.display(),
            found = records.len(),
            "Found record files"
        );

        let io_err = |source: std::io::Error| AggregationError::Io {
            path: output.to_path_buf(),
            source,
        };

        let file = File::create(output).map_err(io_err)?;
        let mut writer = BufWriter::new(file);

        let mut summary = AggregationSummary {
            found: records.len(),
            ..AggregationSummary::default()
        };

        for path in &records {
            let fields = match Self::load_record(path) {
                Ok(fields) => fields,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Skipping record");
                    summary.skipped += 1;
                    continue;
                }
            };

            serde_json::to_writer(&mut writer, &fields)
                .map_err(|e| io_err(std::io::Error::from(e)))?;
            writer.write_all(b"\n").map_err(io_err)?;
            summary.written += 1;
        }

        writer.flush().map_err(io_err)?;

        tracing::info!(
            output = %output.display(),
            written = summary.written,
            skipped = summary.skipped,
            "Aggregation complete"
        );

        Ok(summary)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(fpbatch_common::config::CompiledDefaults::RECORD_EXTENSION)
    }
}
