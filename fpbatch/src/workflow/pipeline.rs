//! Bounded worker pool
//!
//! Every discovered file is one unit of work: resolve output location →
//! skip if a record already exists → run the fingerprint tool → write the
//! record. At most `concurrency` units are in flight; outcomes are yielded in
//! completion order.
//!
//! Workers share nothing but the filesystem. Each unit owns a distinct output
//! location (colliding sources are rejected before dispatch), so no locking
//! is needed and one unit's failure cannot touch another.

use crate::config::BatchConfig;
use crate::error::ItemError;
use crate::models::{AudioFile, BatchSummary, ItemOutcome};
use crate::services::{FingerprintTool, PathResolver, ProgressReporter, RecordWriter};
use futures::stream::{self, Stream, StreamExt};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

/// Fingerprint batch pipeline
pub struct Pipeline {
    resolver: PathResolver,
    tool: Arc<dyn FingerprintTool>,
    writer: RecordWriter,
    concurrency: NonZeroUsize,
}

impl Pipeline {
    pub fn new(
        resolver: PathResolver,
        tool: Arc<dyn FingerprintTool>,
        writer: RecordWriter,
        concurrency: NonZeroUsize,
    ) -> Self {
        Self {
            resolver,
            tool,
            writer,
            concurrency,
        }
    }

    /// Pipeline writing below `config.output_dir` with the given tool
    pub fn from_config(config: &BatchConfig, tool: Arc<dyn FingerprintTool>) -> Self {
        Self::new(
            PathResolver::new(&config.output_dir, &config.record_extension),
            tool,
            RecordWriter::new(config.atomic_writes),
            config.concurrency,
        )
    }

    /// Dispatch `files` and stream their outcomes as they complete
    ///
    /// Output collisions are reported first, without invoking the tool.
    pub fn dispatch(&self, files: Vec<AudioFile>) -> impl Stream<Item = ItemOutcome> + '_ {
        let (claimed, rejected) = self.claim_outputs(files);

        let work = stream::iter(claimed)
            .map(move |(file, output)| self.process_item(file, output))
            .buffer_unordered(self.concurrency.get());

        stream::iter(rejected).chain(work)
    }

    /// Run `files` to completion, feeding every outcome to `reporter`
    pub async fn run(&self, files: Vec<AudioFile>, reporter: &mut dyn ProgressReporter) -> BatchSummary {
        let mut summary = BatchSummary::new(files.len());

        tracing::info!(
            total = summary.total,
            concurrency = self.concurrency.get(),
            output = %self.resolver.output_root().display(),
            "Starting fingerprint batch"
        );
        reporter.on_start(summary.total);

        let outcomes = self.dispatch(files);
        futures::pin_mut!(outcomes);

        while let Some(outcome) = outcomes.next().await {
            summary.record(&outcome);
            reporter.on_item(&outcome, &summary);
        }

        reporter.on_finish(&summary);
        tracing::info!(
            total = summary.total,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Fingerprint batch completed"
        );

        summary
    }

    /// Assign each file its output location
    ///
    /// When several sources resolve to the same location, the smallest
    /// source path keeps it and the others are rejected. The choice only
    /// depends on the input set, so reruns make the same decision.
    fn claim_outputs(&self, files: Vec<AudioFile>) -> (Vec<(AudioFile, PathBuf)>, Vec<ItemOutcome>) {
        let mut by_output: BTreeMap<PathBuf, Vec<AudioFile>> = BTreeMap::new();
        for file in files {
            by_output.entry(self.resolver.resolve(&file)).or_default().push(file);
        }

        let mut claimed = Vec::with_capacity(by_output.len());
        let mut rejected = Vec::new();

        for (output, mut sources) in by_output {
            sources.sort();
            let mut sources = sources.into_iter();
            let Some(kept) = sources.next() else {
                continue;
            };

            for other in sources {
                tracing::warn!(
                    file = %other.path.display(),
                    kept = %kept.path.display(),
                    output = %output.display(),
                    "Output location collision, not processing"
                );
                rejected.push(ItemOutcome::Failed {
                    source: other.path,
                    error: ItemError::OutputCollision {
                        output: output.clone(),
                        kept: kept.path.clone(),
                    },
                });
            }

            claimed.push((kept, output));
        }

        (claimed, rejected)
    }

    /// Process one file; every error stays inside the returned outcome
    async fn process_item(&self, file: AudioFile, output: PathBuf) -> ItemOutcome {
        if tokio::fs::try_exists(&output).await.unwrap_or(false) {
            tracing::debug!(
                file = %file.path.display(),
                output = %output.display(),
                "Record exists, skipping"
            );
            return ItemOutcome::Skipped {
                source: file.path,
                output,
            };
        }

        let record = match self.tool.fingerprint(&file.path).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(file = %file.path.display(), error = %e, "Error processing file");
                return ItemOutcome::Failed {
                    source: file.path,
                    error: e.into(),
                };
            }
        };

        if let Err(e) = self.writer.write(&output, &record).await {
            tracing::error!(file = %file.path.display(), error = %e, "Error writing record");
            return ItemOutcome::Failed {
                source: file.path,
                error: e.into(),
            };
        }

        tracing::debug!(
            file = %file.path.display(),
            output = %output.display(),
            "Record written"
        );
        ItemOutcome::Processed {
            source: file.path,
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InputSpec;
    use crate::services::{InvocationError, NoProgress};
    use async_trait::async_trait;
    use fpbatch_common::FingerprintRecord;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Tool that echoes the file name, failing for names containing "bad"
    #[derive(Default)]
    struct EchoTool {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FingerprintTool for EchoTool {
        async fn fingerprint(&self, audio_path: &Path) -> Result<FingerprintRecord, InvocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = audio_path.file_name().unwrap().to_string_lossy().into_owned();
            if name.contains("bad") {
                return Err(InvocationError::ToolFailure {
                    status: Some(1),
                    stderr: "cannot decode".to_string(),
                });
            }
            let mut record = FingerprintRecord::parse_key_values(&format!("NAME={}", name));
            record.set_provenance(audio_path);
            Ok(record)
        }
    }

    fn pipeline(out: &Path, tool: Arc<EchoTool>, workers: usize) -> Pipeline {
        Pipeline::new(
            PathResolver::new(out, "json"),
            tool,
            RecordWriter::default(),
            NonZeroUsize::new(workers).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let input = InputSpec::DirectoryRoot(PathBuf::from("/music"));
        let files = vec![
            AudioFile::new(&input, PathBuf::from("/music/a.wav")),
            AudioFile::new(&input, PathBuf::from("/music/bad.wav")),
            AudioFile::new(&input, PathBuf::from("/music/sub/c.wav")),
        ];

        let tool = Arc::new(EchoTool::default());
        let summary = pipeline(temp_dir.path(), tool.clone(), 2)
            .run(files, &mut NoProgress)
            .await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert!(temp_dir.path().join("a.json").exists());
        assert!(temp_dir.path().join("sub/c.json").exists());
        assert!(!temp_dir.path().join("bad.json").exists());
        assert_eq!(tool.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_collision_keeps_smallest_source() {
        let temp_dir = TempDir::new().unwrap();
        let input = InputSpec::FileList(PathBuf::from("/lists/files.txt"));
        let files = vec![
            AudioFile::new(&input, PathBuf::from("/z/song.wav")),
            AudioFile::new(&input, PathBuf::from("/a/song.wav")),
        ];

        let tool = Arc::new(EchoTool::default());
        let p = pipeline(temp_dir.path(), tool.clone(), 4);
        let outcomes: Vec<ItemOutcome> = p.dispatch(files).collect().await;

        assert_eq!(outcomes.len(), 2);
        let failed: Vec<_> = outcomes.iter().filter(|o| o.is_failed()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].source(), &PathBuf::from("/z/song.wav"));
        assert!(matches!(
            failed[0],
            ItemOutcome::Failed {
                error: ItemError::OutputCollision { .. },
                ..
            }
        ));
        assert_eq!(tool.calls.load(Ordering::SeqCst), 1);

        let record = std::fs::read(temp_dir.path().join("song.json")).unwrap();
        let record = FingerprintRecord::from_json_slice(&record).unwrap();
        assert_eq!(record.provenance(), Some("/a/song.wav"));
    }

    /// Reporter keeping every event it receives
    #[derive(Default)]
    struct RecordingReporter {
        started: Vec<usize>,
        completed: Vec<usize>,
        finished: Vec<BatchSummary>,
    }

    impl ProgressReporter for RecordingReporter {
        fn on_start(&mut self, total: usize) {
            self.started.push(total);
        }

        fn on_item(&mut self, _outcome: &ItemOutcome, summary: &BatchSummary) {
            self.completed.push(summary.completed());
        }

        fn on_finish(&mut self, summary: &BatchSummary) {
            self.finished.push(*summary);
        }
    }

    #[tokio::test]
    async fn test_reporter_sees_every_outcome() {
        let temp_dir = TempDir::new().unwrap();
        let input = InputSpec::FileList(PathBuf::from("/lists/files.txt"));
        let files = vec![
            AudioFile::new(&input, PathBuf::from("/a/song.wav")),
            AudioFile::new(&input, PathBuf::from("/b/song.wav")),
            AudioFile::new(&input, PathBuf::from("/music/bad.wav")),
            AudioFile::new(&input, PathBuf::from("/music/other.wav")),
        ];

        let mut reporter = RecordingReporter::default();
        let summary = pipeline(temp_dir.path(), Arc::new(EchoTool::default()), 2)
            .run(files, &mut reporter)
            .await;

        assert_eq!(summary.total, 4);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(reporter.started, vec![4]);
        assert_eq!(reporter.completed, vec![1, 2, 3, 4]);
        assert_eq!(reporter.finished, vec![summary]);
    }
}
