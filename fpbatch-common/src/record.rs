//! Fingerprint record document
//!
//! A record is the ordered key/value mapping parsed from the fingerprint
//! tool's output plus the provenance key naming the source audio file.
//! Records are stored as 4-space indented JSON objects whose values are all
//! strings.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Reserved key holding the absolute path of the source audio file
pub const PROVENANCE_KEY: &str = "ori_wav";

/// Ordered string mapping persisted once per input audio file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintRecord {
    fields: Map<String, Value>,
}

impl FingerprintRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` lines
    ///
    /// Each line is split on its first `=`; lines without one are ignored.
    /// A repeated key keeps its first position and takes the last value.
    pub fn parse_key_values(text: &str) -> Self {
        let mut record = Self::new();
        for line in text.trim().lines() {
            if let Some((key, value)) = line.split_once('=') {
                record.insert(key, value);
            }
        }
        record
    }

    /// Insert or replace a field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), Value::String(value.into()));
    }

    /// Stamp the provenance key with the source path, replacing any value the
    /// tool printed under the same name
    pub fn set_provenance(&mut self, source: &Path) {
        self.insert(PROVENANCE_KEY, source.to_string_lossy().into_owned());
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Source path recorded under the provenance key
    pub fn provenance(&self) -> Option<&str> {
        self.get(PROVENANCE_KEY)
    }

    /// Field names in document order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode as a 4-space indented JSON document
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.fields.serialize(&mut serializer)?;
        Ok(buf)
    }

    /// Decode a record document
    ///
    /// The document must be a JSON object whose values are all strings.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        let Value::Object(fields) = value else {
            return Err(Error::InvalidInput(
                "record document is not a JSON object".to_string(),
            ));
        };

        if let Some((key, _)) = fields.iter().find(|(_, v)| !v.is_string()) {
            return Err(Error::InvalidInput(format!(
                "record field '{}' is not a string",
                key
            )));
        }

        Ok(Self { fields })
    }
}
