//! Per-item completion events and batch totals

use crate::error::ItemError;
use std::path::PathBuf;

/// Result of processing one audio file
#[derive(Debug)]
pub enum ItemOutcome {
    /// Tool ran and the record was written
    Processed { source: PathBuf, output: PathBuf },
    /// A record already existed; the tool was not invoked
    Skipped { source: PathBuf, output: PathBuf },
    /// Processing failed for this item only
    Failed { source: PathBuf, error: ItemError },
}

impl ItemOutcome {
    /// Source audio path
    pub fn source(&self) -> &PathBuf {
        match self {
            Self::Processed { source, .. }
            | Self::Skipped { source, .. }
            | Self::Failed { source, .. } => source,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Aggregate counters over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items dispatched
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Count one completion event
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Processed { .. } => self.processed += 1,
            ItemOutcome::Skipped { .. } => self.skipped += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Items finished so far
    pub fn completed(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}
