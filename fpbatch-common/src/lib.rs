//! # fpbatch Common Library
//!
//! Shared code for the fpbatch tools including:
//! - Error type shared by configuration and record handling
//! - Configuration file loading and value resolution
//! - The fingerprint record document and its JSON codec
//! - Logging initialisation for the binaries

pub mod config;
pub mod error;
pub mod logging;
pub mod record;

pub use error::{Error, Result};
pub use record::{FingerprintRecord, PROVENANCE_KEY};
