//! INI configuration file.
//!
//! Settings live in `~/.config/fieldscope/config.ini` (platform config dir):
//!
//! ```ini
//! [server]
//! base_url = http://localhost:5601
//! timeout_secs = 30
//! api_key =
//!
//! [existence]
//! from_date = now-15m
//! to_date = now
//!
//! [logging]
//! directory = /home/user/.local/share/fieldscope/logs
//! level = info
//! ```
//!
//! Missing keys fall back to their defaults. [`ConfigKey`] gives the CLI
//! `section.key` access to every setting.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::http::DEFAULT_TIMEOUT_SECS;

/// Default server URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5601";

/// Default start of the existence date range.
pub const DEFAULT_FROM_DATE: &str = "now-15m";

/// Default end of the existence date range.
pub const DEFAULT_TO_DATE: &str = "now";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors reading or writing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fieldscope")
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fieldscope")
        .join("logs")
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

/// `[existence]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistenceSettings {
    pub from_date: String,
    pub to_date: String,
}

impl Default for ExistenceSettings {
    fn default() -> Self {
        Self {
            from_date: DEFAULT_FROM_DATE.to_string(),
            to_date: DEFAULT_TO_DATE.to_string(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub existence: ExistenceSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|s| s.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path)?;
        Ok(())
    }
}

/// Every settable key, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ServerBaseUrl,
    ServerTimeoutSecs,
    ServerApiKey,
    ExistenceFromDate,
    ExistenceToDate,
    LoggingDirectory,
    LoggingLevel,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ServerBaseUrl,
            ConfigKey::ServerTimeoutSecs,
            ConfigKey::ServerApiKey,
            ConfigKey::ExistenceFromDate,
            ConfigKey::ExistenceToDate,
            ConfigKey::LoggingDirectory,
            ConfigKey::LoggingLevel,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ServerBaseUrl | ConfigKey::ServerTimeoutSecs | ConfigKey::ServerApiKey => {
                "server"
            }
            ConfigKey::ExistenceFromDate | ConfigKey::ExistenceToDate => "existence",
            ConfigKey::LoggingDirectory | ConfigKey::LoggingLevel => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ServerBaseUrl => "base_url",
            ConfigKey::ServerTimeoutSecs => "timeout_secs",
            ConfigKey::ServerApiKey => "api_key",
            ConfigKey::ExistenceFromDate => "from_date",
            ConfigKey::ExistenceToDate => "to_date",
            ConfigKey::LoggingDirectory => "directory",
            ConfigKey::LoggingLevel => "level",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ServerBaseUrl => config.server.base_url.clone(),
            ConfigKey::ServerTimeoutSecs => config.server.timeout_secs.to_string(),
            ConfigKey::ServerApiKey => config.server.api_key.clone().unwrap_or_default(),
            ConfigKey::ExistenceFromDate => config.existence.from_date.clone(),
            ConfigKey::ExistenceToDate => config.existence.to_date.clone(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Parse and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::ServerBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(self.invalid(value, "must start with http:// or https://"));
                }
                config.server.base_url = value.to_string();
            }
            ConfigKey::ServerTimeoutSecs => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| self.invalid(value, "must be a whole number of seconds"))?;
                if secs == 0 {
                    return Err(self.invalid(value, "must be greater than zero"));
                }
                config.server.timeout_secs = secs;
            }
            ConfigKey::ServerApiKey => {
                config.server.api_key = (!value.is_empty()).then(|| value.to_string());
            }
            ConfigKey::ExistenceFromDate => config.existence.from_date = value.to_string(),
            ConfigKey::ExistenceToDate => config.existence.to_date = value.to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory = PathBuf::from(value),
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.logging.level = value.to_string();
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
