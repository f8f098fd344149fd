//! Runtime configuration loaded from TOML.
//!
//! # Responsibility
//! - Resolve storage, logging, notice and dispatch settings.
//! - Supply platform defaults when no file exists.
//!
//! # Invariants
//! - A missing config file is not an error; a malformed one is.
//! - `simulated_failure_rate` is within `0.0..=1.0` after loading.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "notifyhub";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "notifyhub.sqlite3";
const LOG_DIR_NAME: &str = "logs";
const DEFAULT_NOTICE_TTL_MS: u64 = 2000;
const DEFAULT_SIMULATED_DELAY_MS: u64 = 1500;
const DEFAULT_SIMULATED_FAILURE_RATE: f64 = 0.1;

/// Selected notification delivery strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStrategy {
    /// Open the local mail client with a `mailto:` URI.
    #[default]
    Mailto,
    /// Simulated remote service with artificial delay and failures.
    Simulated,
}

/// `[dispatch]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    pub strategy: DispatchStrategy,
    pub simulated_delay_ms: u64,
    pub simulated_failure_rate: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strategy: DispatchStrategy::default(),
            simulated_delay_ms: DEFAULT_SIMULATED_DELAY_MS,
            simulated_failure_rate: DEFAULT_SIMULATED_FAILURE_RATE,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifyHubConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub notice_ttl_ms: u64,
    pub dispatch: DispatchConfig,
}

impl Default for NotifyHubConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            database_path: data_dir.join(DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: data_dir.join(LOG_DIR_NAME),
            notice_ttl_ms: DEFAULT_NOTICE_TTL_MS,
            dispatch: DispatchConfig::default(),
        }
    }
}

impl NotifyHubConfig {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.dispatch.simulated_failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Invalid(format!(
                "dispatch.simulated_failure_rate must be within 0..=1, got {rate}"
            )));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration loading failures.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Default config file location, `<config_dir>/notifyhub/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Loads configuration from `path`, or from the default location when
/// `path` is `None`.
///
/// # Errors
/// - `Read` when an explicitly given file cannot be read.
/// - `Parse` when the file is not valid TOML for this schema.
/// - `Invalid` when values are out of range.
pub fn load_config(path: Option<&Path>) -> Result<NotifyHubConfig, ConfigError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(NotifyHubConfig::default()),
        },
    };

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
            return Ok(NotifyHubConfig::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    parse_config(&raw).map_err(|err| match err {
        ParseFailure::Toml(source) => ConfigError::Parse { path, source },
        ParseFailure::Invalid(err) => err,
    })
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(ConfigError),
}

fn parse_config(raw: &str) -> Result<NotifyHubConfig, ParseFailure> {
    let config: NotifyHubConfig = toml::from_str(raw).map_err(ParseFailure::Toml)?;
    config.validate().map_err(ParseFailure::Invalid)?;
    Ok(config)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}
