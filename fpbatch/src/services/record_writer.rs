//! Record persistence
//!
//! Writes one JSON record per audio file, creating parent directories as
//! needed. With atomic writes enabled the document goes to a hidden temp file
//! in the destination directory and is renamed into place, so an interrupted
//! run never leaves a partial record at the final path.

use fpbatch_common::FingerprintRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Record write errors
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode record: {0}")]
    Serialize(#[from] fpbatch_common::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Record writer
#[derive(Debug, Clone)]
pub struct RecordWriter {
    atomic: bool,
}

impl RecordWriter {
    /// Writer using temp-file-then-rename when `atomic` is true
    pub fn new(atomic: bool) -> Self {
        Self { atomic }
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic
    }

    /// Persist `record` at `location`
    ///
    /// Overwrites whatever is at `location`; skipping existing records is the
    /// dispatcher's job.
    pub async fn write(&self, location: &Path, record: &FingerprintRecord) -> Result<(), WriteError> {
        if let Some(parent) = location.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        remove_stale_temps(location).await;

        let bytes = record.to_json_pretty()?;

        if !self.atomic {
            return tokio::fs::write(location, &bytes)
                .await
                .map_err(|source| WriteError::Io {
                    path: location.to_path_buf(),
                    source,
                });
        }

        let temp = temp_path_for(location);
        if let Err(source) = tokio::fs::write(&temp, &bytes).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(WriteError::Io { path: temp, source });
        }

        if let Err(source) = tokio::fs::rename(&temp, location).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(WriteError::Io {
                path: location.to_path_buf(),
                source,
            });
        }

        Ok(())
    }
}

impl Default for RecordWriter {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Delete temp files left next to `location` by an interrupted write
///
/// Only names of the exact `.<name>.<uuid>.tmp` shape are touched. Each
/// location is owned by one worker, so no live temp file can match.
async fn remove_stale_temps(location: &Path) {
    let (Some(dir), Some(name)) = (location.parent(), location.file_name()) else {
        return;
    };
    let prefix = format!(".{}.", name.to_string_lossy());

    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        let is_stale = file_name
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_suffix(".tmp"))
            .is_some_and(|id| uuid::Uuid::parse_str(id).is_ok());
        if !is_stale {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => tracing::debug!(file = %entry.path().display(), "Removed stale temp file"),
            Err(e) => {
                tracing::warn!(file = %entry.path().display(), error = %e, "Failed to remove stale temp file")
            }
        }
    }
}

/// Hidden sibling temp path: `.<name>.<uuid>.tmp`
fn temp_path_for(location: &Path) -> PathBuf {
    let name = location
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    location.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> FingerprintRecord {
        let mut record = FingerprintRecord::parse_key_values("DURATION=12\nFINGERPRINT=AQAB");
        record.set_provenance(Path::new("/music/a/b.wav"));
        record
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join("a").join("b").join("c.json");

        RecordWriter::default().write(&location, &sample_record()).await.unwrap();

        let bytes = std::fs::read(&location).unwrap();
        let decoded = FingerprintRecord::from_json_slice(&bytes).unwrap();
        assert_eq!(decoded, sample_record());
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join("c.json");

        RecordWriter::new(true).write(&location, &sample_record()).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["c.json".to_string()]);
    }

    #[tokio::test]
    async fn test_direct_write() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join("nested").join("c.json");

        let writer = RecordWriter::new(false);
        assert!(!writer.is_atomic());
        writer.write(&location, &sample_record()).await.unwrap();

        let text = std::fs::read_to_string(&location).unwrap();
        assert!(text.starts_with("{\n    \"DURATION\": \"12\""));
    }

    #[tokio::test]
    async fn test_write_removes_leftover_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join("c.json");
        let leftover = temp_path_for(&location);
        std::fs::write(&leftover, "{\n    \"DURATION\": ").unwrap();
        // Temp file of a different record whose name starts the same way
        let neighbour = temp_path_for(&temp_dir.path().join("c.json.x.json"));
        std::fs::write(&neighbour, "{}").unwrap();
        std::fs::write(temp_dir.path().join("notes.tmp"), "keep").unwrap();

        RecordWriter::new(true).write(&location, &sample_record()).await.unwrap();

        assert!(!leftover.exists());
        assert!(neighbour.exists());
        assert!(temp_dir.path().join("notes.tmp").exists());
        assert!(location.exists());
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/out/a/b.json"));
        assert_eq!(temp.parent(), Some(Path::new("/out/a")));
        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".b.json."));
        assert!(name.ends_with(".tmp"));
    }
}
