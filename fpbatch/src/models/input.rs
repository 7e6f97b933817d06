//! Input description and discovered audio files

use crate::services::file_scanner::ScanError;
use std::path::{Path, PathBuf};

/// Where the audio files come from
///
/// The variant decides both how files are discovered and how their output
/// location is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// Recursively walk this directory; output mirrors its layout
    DirectoryRoot(PathBuf),
    /// Newline-separated list of audio paths; output is flat by basename
    FileList(PathBuf),
}

impl InputSpec {
    /// Classify an input path
    ///
    /// A directory is walked, anything else that exists is read as a list.
    /// The path is made absolute so relative keys and provenance never
    /// depend on how the path was spelled.
    pub fn detect(path: &Path) -> Result<Self, ScanError> {
        if !path.exists() {
            return Err(ScanError::PathNotFound(path.to_path_buf()));
        }

        let absolute = std::path::absolute(path)
            .map_err(|e| ScanError::FileAccessError(path.to_path_buf(), e.to_string()))?;

        if absolute.is_dir() {
            Ok(Self::DirectoryRoot(absolute))
        } else {
            Ok(Self::FileList(absolute))
        }
    }

    /// Input root path (directory or list file)
    pub fn path(&self) -> &Path {
        match self {
            Self::DirectoryRoot(p) | Self::FileList(p) => p,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::DirectoryRoot(_))
    }
}

/// One candidate audio file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AudioFile {
    /// Absolute path of the audio file
    pub path: PathBuf,
    /// Path relative to the input root (directory mode) or the basename
    /// (list mode)
    pub relative_key: PathBuf,
}

impl AudioFile {
    /// Build an audio file entry, deriving its relative key from the input
    pub fn new(input: &InputSpec, path: PathBuf) -> Self {
        let relative_key = crate::services::path_resolver::relative_key(input, &path);
        Self { path, relative_key }
    }
}
