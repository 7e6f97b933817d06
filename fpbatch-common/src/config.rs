//! Configuration file loading and value resolution
//!
//! Settings are resolved with the priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the fingerprint tool
pub const ENV_TOOL: &str = "FPBATCH_TOOL";

/// Environment variable holding the worker count
pub const ENV_PROCESSES: &str = "FPBATCH_PROCESSES";

/// Contents of `config.toml`
///
/// Every field is optional; missing fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Fingerprint tool program name or path
    pub tool: Option<String>,
    /// Audio extensions picked up by directory discovery
    pub extensions: Option<Vec<String>>,
    /// Worker count
    pub processes: Option<usize>,
    /// Write records through a temporary file and rename
    pub atomic_writes: Option<bool>,
    /// Draw a progress bar on the terminal
    pub progress_bar: Option<bool>,
    pub logging: LoggingConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: CompiledDefaults::LOG_LEVEL.to_string(),
        }
    }
}

/// Compiled fallback values
#[derive(Debug, Clone, Copy)]
pub struct CompiledDefaults;

impl CompiledDefaults {
    pub const TOOL: &'static str = "fpcalc";
    pub const EXTENSIONS: [&'static str; 6] = ["wav", "mp3", "flac", "webm", "mp4", "m4a"];
    pub const RECORD_EXTENSION: &'static str = "json";
    pub const LOG_LEVEL: &'static str = "info";

    /// Default extension set as owned strings
    pub fn extensions() -> Vec<String> {
        Self::EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }
}

impl TomlConfig {
    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::TomlParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the config file, if any
    ///
    /// An explicitly requested file must exist and parse. Without one, the
    /// platform locations are probed and a missing file yields defaults; a
    /// file that exists but does not parse is handed back in
    /// [`LoadedConfig::ignored`] and defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(LoadedConfig {
                config: Self::from_file(path)?,
                source: Some(path.to_path_buf()),
                ignored: None,
            });
        }

        let Some(path) = default_config_path() else {
            return Ok(LoadedConfig::default());
        };

        match Self::from_file(&path) {
            Ok(config) => Ok(LoadedConfig {
                config,
                source: Some(path),
                ignored: None,
            }),
            Err(e) => Ok(LoadedConfig {
                config: Self::default(),
                source: None,
                ignored: Some((path, e)),
            }),
        }
    }
}

/// Result of [`TomlConfig::load`]
///
/// Loading runs before logging is installed, so anything worth reporting is
/// returned to the caller instead of logged here.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    /// File the settings came from
    pub source: Option<PathBuf>,
    /// Default-location file that exists but could not be used
    pub ignored: Option<(PathBuf, Error)>,
}

/// Locate the platform config file
///
/// `<config_dir>/fpbatch/config.toml` first, then `/etc/fpbatch/config.toml`
/// on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("fpbatch").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/fpbatch/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve one setting from CLI → environment → TOML → default
///
/// An environment value that does not parse is a configuration error rather
/// than being silently skipped.
pub fn resolve_value<T>(
    cli_arg: Option<T>,
    env_var_name: &str,
    toml_value: Option<T>,
    default: T,
) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    // Priority 1: Command-line argument
    if let Some(value) = cli_arg {
        return Ok(value);
    }

    // Priority 2: Environment variable
    if let Ok(raw) = std::env::var(env_var_name) {
        if !raw.trim().is_empty() {
            return raw.trim().parse().map_err(|e: T::Err| {
                Error::Config(format!("Invalid {}='{}': {}", env_var_name, raw, e))
            });
        }
    }

    // Priority 3: TOML config file
    if let Some(value) = toml_value {
        return Ok(value);
    }

    // Priority 4: Compiled default
    Ok(default)
}
