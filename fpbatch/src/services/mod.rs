//! Pipeline services

pub mod aggregator;
pub mod file_scanner;
pub mod fingerprinter;
pub mod path_resolver;
pub mod progress;
pub mod record_writer;

pub use aggregator::{AggregationError, AggregationSummary, Aggregator};
pub use file_scanner::{FileScanner, ScanError, ScanResult};
pub use fingerprinter::{FingerprintTool, Fingerprinter, InvocationError};
pub use path_resolver::PathResolver;
pub use progress::{BarLogWriter, BarProgress, LogProgress, NoProgress, ProgressReporter};
pub use record_writer::{RecordWriter, WriteError};
