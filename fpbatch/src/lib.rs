//! fpbatch - batch acoustic fingerprinting
//!
//! Discovers audio files (directory walk or file list), runs an external
//! fingerprint tool on each with bounded parallelism and stores one JSON
//! record per file in a tree mirroring the input. Existing records are
//! skipped, so an interrupted batch resumes where it stopped.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::config::BatchConfig;
pub use crate::error::{ItemError, PipelineError};
pub use crate::models::{AudioFile, BatchSummary, InputSpec, ItemOutcome};
pub use crate::workflow::{discover, process, run_batch, Pipeline};
