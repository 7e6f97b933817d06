//! Common error types for fpbatch

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for fpbatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the fpbatch tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration file could not be parsed
    #[error("Failed to parse config file {path}: {message}")]
    TomlParse { path: PathBuf, message: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or document shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
