//! Layered configuration
//!
//! Settings are merged from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. User config (`$FAILSCAN_CONFIG` or `~/.config/failscan/config.toml`)
//! 3. CLI flags

mod defaults;
mod edit;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use edit::{init_file, set_key, DEFAULT_CONFIG_TEMPLATE, SETTABLE_KEYS};
pub use effective::{ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the user config location
pub const CONFIG_ENV: &str = "FAILSCAN_CONFIG";

/// Error types for config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("cannot locate config file: neither FAILSCAN_CONFIG nor HOME is set")]
    NoHome,
}

/// Fully merged settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub logs: LogsSettings,
    pub report: ReportSettings,
    pub scan: ScanSettings,
    pub viewer: ViewerSettings,
}

/// Where logs live and how they are listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogsSettings {
    /// Directory holding CI run logs
    pub directory: Option<PathBuf>,

    /// List the most recently modified log first
    pub newest_first: bool,

    /// Extra glob patterns for files to leave out of listings
    pub ignore: Vec<String>,
}

/// Where reports are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportSettings {
    /// Write each report to a fresh temp file
    pub use_temp_file: bool,

    /// Directory for named reports, used when `use_temp_file` is false
    pub directory: Option<PathBuf>,
}

/// Scanner tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanSettings {
    /// Lines the extractor may skip looking for a reason start line.
    /// Unset means unbounded.
    pub start_search_limit: Option<usize>,
}

/// External program used to open reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewerSettings {
    pub command: String,

    /// Arguments placed before the report path
    pub args: Vec<String>,
}

impl Settings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.start_search_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "scan.start_search_limit must be at least 1".to_string(),
            ));
        }
        if self.viewer.command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "viewer.command must not be empty".to_string(),
            ));
        }
        if !self.report.use_temp_file && self.report.directory.is_none() {
            return Err(ConfigError::Invalid(
                "report.directory is required when report.use_temp_file is false".to_string(),
            ));
        }
        Ok(())
    }

    /// The log directory, if configured
    pub fn log_directory(&self) -> Option<&Path> {
        self.logs.directory.as_deref()
    }
}

/// Resolve the user config path: explicit flag, then `$FAILSCAN_CONFIG`,
/// then `$HOME/.config/failscan/config.toml`.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
    Ok(PathBuf::from(home).join(".config/failscan/config.toml"))
}
