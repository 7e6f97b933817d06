//! Data models for the fingerprint batch pipeline

pub mod input;
pub mod outcome;

pub use input::{AudioFile, InputSpec};
pub use outcome::{BatchSummary, ItemOutcome};
