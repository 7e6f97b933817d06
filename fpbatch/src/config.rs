//! Batch configuration
//!
//! Assembles the settings a run needs from command-line values, environment
//! variables, the TOML config file and compiled defaults. The default worker
//! count is computed once here from the host CPU count and then passed down
//! explicitly.

use fpbatch_common::config::{resolve_value, CompiledDefaults, TomlConfig, ENV_PROCESSES, ENV_TOOL};
use fpbatch_common::{Error, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Values given on the command line (`None` = not given)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub processes: Option<usize>,
    pub tool: Option<String>,
    pub extensions: Vec<String>,
    pub atomic_writes: Option<bool>,
    pub progress_bar: Option<bool>,
}

/// Fully resolved settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory to walk or list file to read
    pub input: PathBuf,
    /// Root of the record tree
    pub output_dir: PathBuf,
    /// Fingerprint program
    pub tool: String,
    /// Accepted audio extensions (lowercase, no dot)
    pub extensions: Vec<String>,
    /// Record file extension
    pub record_extension: String,
    /// Worker count
    pub concurrency: NonZeroUsize,
    /// Temp-file-then-rename record writes
    pub atomic_writes: bool,
    /// Draw a terminal progress bar
    pub progress_bar: bool,
}

impl BatchConfig {
    /// Config with compiled defaults
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            tool: CompiledDefaults::TOOL.to_string(),
            extensions: CompiledDefaults::extensions(),
            record_extension: CompiledDefaults::RECORD_EXTENSION.to_string(),
            concurrency: default_concurrency(),
            atomic_writes: true,
            progress_bar: true,
        }
    }

    /// Resolve every setting: CLI → environment → TOML → default
    pub fn resolve(
        input: PathBuf,
        output_dir: PathBuf,
        cli: CliOverrides,
        toml: &TomlConfig,
    ) -> Result<Self> {
        let defaults = Self::new(input, output_dir);

        let tool = resolve_value(cli.tool, ENV_TOOL, toml.tool.clone(), defaults.tool)?;
        if tool.trim().is_empty() {
            return Err(Error::Config("fingerprint tool must not be empty".to_string()));
        }

        let processes = resolve_value(
            cli.processes,
            ENV_PROCESSES,
            toml.processes,
            defaults.concurrency.get(),
        )?;
        let concurrency = NonZeroUsize::new(processes).ok_or_else(|| {
            Error::Config("number of processes must be at least 1".to_string())
        })?;

        let extensions = if !cli.extensions.is_empty() {
            cli.extensions
        } else {
            toml.extensions.clone().unwrap_or(defaults.extensions)
        };
        let extensions = normalize_extensions(extensions);
        if extensions.is_empty() {
            return Err(Error::Config("at least one audio extension is required".to_string()));
        }

        Ok(Self {
            tool,
            concurrency,
            extensions,
            atomic_writes: cli
                .atomic_writes
                .or(toml.atomic_writes)
                .unwrap_or(defaults.atomic_writes),
            progress_bar: cli
                .progress_bar
                .or(toml.progress_bar)
                .unwrap_or(defaults.progress_bar),
            ..defaults
        })
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Host CPU count (at least 1)
pub fn default_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}
