//! Progress reporting
//!
//! Reporters observe completion events and render aggregate counts. They
//! receive shared references only and have no way to influence a run.

use crate::models::{BatchSummary, ItemOutcome};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use tracing_subscriber::fmt::MakeWriter;

/// Observer of batch progress
pub trait ProgressReporter: Send {
    /// Batch is about to dispatch `total` items
    fn on_start(&mut self, _total: usize) {}

    /// One item finished; `summary` already counts it
    fn on_item(&mut self, outcome: &ItemOutcome, summary: &BatchSummary);

    /// All items finished
    fn on_finish(&mut self, _summary: &BatchSummary) {}
}

/// Reporter that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn on_item(&mut self, _outcome: &ItemOutcome, _summary: &BatchSummary) {}
}

/// Logs a progress line every `every` completions and at the end
#[derive(Debug, Clone)]
pub struct LogProgress {
    every: usize,
}

impl LogProgress {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressReporter for LogProgress {
    fn on_item(&mut self, _outcome: &ItemOutcome, summary: &BatchSummary) {
        let current = summary.completed();
        if current % self.every == 0 || current == summary.total {
            tracing::info!(
                progress = %format!("{}/{}", current, summary.total),
                processed = summary.processed,
                skipped = summary.skipped,
                failed = summary.failed,
                "Pipeline progress update"
            );
        }
    }
}

/// Terminal progress bar
///
/// The bar stays hidden until [`ProgressReporter::on_start`]. Log output
/// sharing the terminal should go through [`BarProgress::log_writer`].
#[derive(Debug)]
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Standard error writer that clears the bar around each log line
    pub fn log_writer(&self) -> BarLogWriter {
        BarLogWriter {
            bar: self.bar.clone(),
        }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn on_start(&mut self, total: usize) {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        self.bar.set_style(style);
        self.bar.set_length(total as u64);
        self.bar.set_message("Processing Audio Files");
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    fn on_item(&mut self, _outcome: &ItemOutcome, summary: &BatchSummary) {
        self.bar.inc(1);
        if summary.failed > 0 {
            self.bar.set_message(format!("{} failed", summary.failed));
        }
    }

    fn on_finish(&mut self, summary: &BatchSummary) {
        self.bar.finish_with_message(format!(
            "{} processed, {} skipped, {} failed",
            summary.processed, summary.skipped, summary.failed
        ));
    }
}

/// Log writer for use next to a [`BarProgress`]
#[derive(Debug, Clone)]
pub struct BarLogWriter {
    bar: ProgressBar,
}

impl Write for BarLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.bar.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for BarLogWriter {
    type Writer = BarLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
