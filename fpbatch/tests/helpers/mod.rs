//! Test Helper Utilities
//!
//! Fake fingerprint tools and record readers shared by the integration tests.

#![allow(dead_code)]

use fpbatch_common::FingerprintRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// A fake fingerprint tool script living in a temp directory
///
/// Every invocation appends its argument to `log`. Files named "bad*"
/// make the tool print to stderr and exit 2; everything else prints a few
/// `key=value` lines, including a duplicate key and a spoofed provenance
/// field.
pub struct FakeTool {
    pub program: PathBuf,
    pub log: PathBuf,
}

impl FakeTool {
    #[cfg(unix)]
    pub fn install(dir: &Path) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let program = dir.join("fake-fpcalc");
        let log = dir.join("invocations.log");
        let script = format!(
            r#"#!/bin/sh
echo "$1" >> "{log}"
case "$(basename "$1")" in
  bad*)
    echo "ERROR: could not decode $1" >&2
    exit 2
    ;;
esac
echo "DURATION=1"
echo "FILE=$(basename "$1")"
echo "banner line without separator"
echo "DURATION=42"
echo "ori_wav=/spoofed/by/tool.wav"
"#,
            log = log.display()
        );
        fs::write(&program, script).unwrap();
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();

        Self { program, log }
    }

    /// Paths the tool was invoked with, in call order
    pub fn invocations(&self) -> Vec<PathBuf> {
        match fs::read_to_string(&self.log) {
            Ok(text) => text.lines().map(PathBuf::from).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations().len()
    }
}

/// Create `relative` below `root` with a few placeholder bytes
pub fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"RIFF....WAVE").unwrap();
    path
}

/// Read a record written by the pipeline
pub fn read_record(path: &Path) -> FingerprintRecord {
    let bytes = fs::read(path).unwrap_or_else(|e| panic!("missing record {}: {}", path.display(), e));
    FingerprintRecord::from_json_slice(&bytes).unwrap()
}

/// All files below `root` as (relative path, contents), sorted
pub fn snapshot_tree(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut entries: Vec<(PathBuf, Vec<u8>)> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            let bytes = fs::read(e.path()).unwrap();
            (rel, bytes)
        })
        .collect();
    entries.sort();
    entries
}
