//! Output location resolution
//!
//! Maps an input audio file to the path of its record. The mapping depends
//! only on the input root, the output root and the file itself, so a rerun
//! always lands on the same paths and can tell finished work apart.

use crate::models::{AudioFile, InputSpec};
use std::path::{Path, PathBuf};

/// Relative key of `audio_path` under `input`
///
/// Directory mode keeps the path below the root; list mode keeps only the
/// basename.
pub fn relative_key(input: &InputSpec, audio_path: &Path) -> PathBuf {
    match input {
        InputSpec::DirectoryRoot(root) => match audio_path.strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            // Not below the root (only possible for hand-built entries)
            Err(_) => basename(audio_path),
        },
        InputSpec::FileList(_) => basename(audio_path),
    }
}

fn basename(path: &Path) -> PathBuf {
    path.file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf())
}

/// Output location for a relative key
///
/// `output_root / dirname(key) / stem(key) + "." + record_extension`
pub fn output_location(output_root: &Path, relative_key: &Path, record_extension: &str) -> PathBuf {
    output_root.join(relative_key).with_extension(record_extension)
}

/// Resolve the output location of `audio_path`
pub fn resolve(
    input_root: &Path,
    output_root: &Path,
    audio_path: &Path,
    input_is_directory: bool,
    record_extension: &str,
) -> PathBuf {
    let input = if input_is_directory {
        InputSpec::DirectoryRoot(input_root.to_path_buf())
    } else {
        InputSpec::FileList(input_root.to_path_buf())
    };
    output_location(output_root, &relative_key(&input, audio_path), record_extension)
}

/// Resolver bound to one output root
#[derive(Debug, Clone)]
pub struct PathResolver {
    output_root: PathBuf,
    record_extension: String,
}

impl PathResolver {
    pub fn new(output_root: impl Into<PathBuf>, record_extension: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            record_extension: record_extension.into(),
        }
    }

    /// Output location of a discovered file
    pub fn resolve(&self, file: &AudioFile) -> PathBuf {
        output_location(&self.output_root, &file.relative_key, &self.record_extension)
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}
