//! Audio file discovery
//!
//! Two input modes:
//! - Directory: recursive walk keeping files whose extension is in the
//!   configured set (case-insensitive)
//! - File list: one path per line; blank lines and entries that do not
//!   exist are dropped without error
//!
//! Both modes return a de-duplicated set.

use crate::models::{AudioFile, InputSpec};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Audio file scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Cannot access file
    #[error("File access error {0}: {1}")]
    FileAccessError(PathBuf, String),
}

/// Discovery result with statistics
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// De-duplicated audio files, sorted by path
    pub files: Vec<AudioFile>,
    /// Count of files by extension (lowercase)
    pub by_format: HashMap<String, usize>,
    /// List entries dropped because the path does not exist
    pub missing_entries: usize,
    /// Entries dropped as duplicates
    pub duplicates: usize,
}

/// Audio file scanner
#[derive(Debug, Clone)]
pub struct FileScanner {
    extensions: HashSet<String>,
}

impl FileScanner {
    /// Create scanner accepting the given extensions
    ///
    /// Extensions may be given with or without a leading dot, in any case.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Discover candidate audio files for an input
    pub fn discover(&self, input: &InputSpec) -> Result<ScanResult, ScanError> {
        let (paths, missing_entries) = match input {
            InputSpec::DirectoryRoot(root) => (self.scan_directory(root)?, 0),
            InputSpec::FileList(list) => read_file_list(list)?,
        };

        let found = paths.len();
        let unique: BTreeSet<PathBuf> = paths.into_iter().collect();
        let duplicates = found - unique.len();

        let mut by_format = HashMap::new();
        for path in &unique {
            if let Some(ext) = path.extension() {
                let ext_str = ext.to_string_lossy().to_lowercase();
                *by_format.entry(ext_str).or_insert(0) += 1;
            }
        }

        let files: Vec<AudioFile> = unique
            .into_iter()
            .map(|path| AudioFile::new(input, path))
            .collect();

        tracing::debug!(
            input = %input.path().display(),
            files = files.len(),
            duplicates,
            missing_entries,
            "Discovery complete"
        );

        Ok(ScanResult {
            files,
            by_format,
            missing_entries,
            duplicates,
        })
    }

    /// Recursively collect files under `root` with an accepted extension
    ///
    /// Symlinked directories are not followed; symlinks to regular files
    /// count as files.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }

        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut audio_files = Vec::new();

        for entry in WalkDir::new(root).follow_links(false) {
            match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    let is_file = file_type.is_file()
                        || (file_type.is_symlink() && entry.path().is_file());
                    if is_file && self.is_audio_extension(entry.path()) {
                        audio_files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    // Continue scanning, don't abort
                }
            }
        }

        Ok(audio_files)
    }

    /// Check if the path's extension is in the accepted set
    pub fn is_audio_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.extensions.contains(&ext.to_string_lossy().to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new(fpbatch_common::config::CompiledDefaults::EXTENSIONS)
    }
}

/// Read a newline-separated list of audio paths
///
/// Lines are trimmed, blank lines skipped, and entries that do not exist are
/// dropped silently. Relative entries are made absolute against the working
/// directory. Returns the kept paths and the number of missing entries.
pub fn read_file_list(list: &Path) -> Result<(Vec<PathBuf>, usize), ScanError> {
    if !list.exists() {
        return Err(ScanError::PathNotFound(list.to_path_buf()));
    }

    let content = std::fs::read_to_string(list)
        .map_err(|e| ScanError::FileAccessError(list.to_path_buf(), e.to_string()))?;

    let mut files = Vec::new();
    let mut missing = 0;

    for line in content.lines() {
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }

        let path = Path::new(entry);
        if !path.exists() {
            missing += 1;
            continue;
        }

        match std::path::absolute(path) {
            Ok(absolute) => files.push(absolute),
            Err(e) => {
                tracing::warn!(entry, error = %e, "Cannot make list entry absolute");
            }
        }
    }

    Ok((files, missing))
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_audio_extension_detection() {
        let scanner = FileScanner::default();
        assert!(scanner.is_audio_extension(Path::new("a.mp3")));
        assert!(scanner.is_audio_extension(Path::new("a.FLAC")));
        assert!(scanner.is_audio_extension(Path::new("a.M4a")));
        assert!(!scanner.is_audio_extension(Path::new("a.txt")));
        assert!(!scanner.is_audio_extension(Path::new("wav")));
    }

    #[test]
    fn test_custom_extensions_accept_dots_and_case() {
        let scanner = FileScanner::new([".OGG", "opus"]);
        assert!(scanner.is_audio_extension(Path::new("x.ogg")));
        assert!(scanner.is_audio_extension(Path::new("x.Opus")));
        assert!(!scanner.is_audio_extension(Path::new("x.wav")));
    }

    #[test]
    fn test_scan_nonexistent_path() {
        let scanner = FileScanner::default();
        let result = scanner.scan_directory(Path::new("/nonexistent/path"));
        assert!(matches!(result, Err(ScanError::PathNotFound(_))));
    }

    #[test]
    fn test_scan_file_as_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("list.txt");
        fs::write(&file, "").unwrap();

        let result = FileScanner::default().scan_directory(&file);
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileScanner::default().scan_directory(temp_dir.path()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_file_list_skips_blank_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        let song = temp_dir.path().join("song.wav");
        fs::write(&song, b"RIFF").unwrap();

        let list = temp_dir.path().join("files.txt");
        fs::write(
            &list,
            format!("\n  {}  \n/definitely/missing.wav\n\n", song.display()),
        )
        .unwrap();

        let (files, missing) = read_file_list(&list).unwrap();
        assert_eq!(files, vec![song]);
        assert_eq!(missing, 1);
    }
}
