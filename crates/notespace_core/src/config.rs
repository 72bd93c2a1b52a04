//! Runtime configuration assembled from environment variables.
//!
//! | Variable                       | Default                  |
//! |--------------------------------|--------------------------|
//! | `NOTESPACE_DATA_DIR`           | `./data`                 |
//! | `NOTESPACE_LOG_LEVEL`          | `debug` / `info` by build |
//! | `NOTESPACE_LOG_DIR`            | `<data dir>/logs`        |
//! | `NOTESPACE_AUTH_TIMEOUT_SECS`  | `10`                     |
//! | `SUPABASE_URL`, `SUPABASE_KEY` | unset (auth disabled)    |
//! | `NOTESPACE_LOCAL_OWNER`        | `false`                  |
//!
//! Blank values count as unset.

use crate::auth::identity::{IdentityConfig, DEFAULT_IDENTITY_TIMEOUT};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DATA_DIR: &str = "NOTESPACE_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "NOTESPACE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTESPACE_LOG_DIR";
pub const ENV_AUTH_TIMEOUT_SECS: &str = "NOTESPACE_AUTH_TIMEOUT_SECS";
pub const ENV_IDENTITY_URL: &str = "SUPABASE_URL";
pub const ENV_IDENTITY_KEY: &str = "SUPABASE_KEY";
pub const ENV_LOCAL_OWNER: &str = "NOTESPACE_LOCAL_OWNER";

const DEFAULT_DATA_DIR: &str = "data";
const WORKSPACE_FILE_NAME: &str = "pages.json";
const SETTINGS_FILE_NAME: &str = "settings.json";
const LOG_DIR_NAME: &str = "logs";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Log level is not one of `trace|debug|info|warn|error`.
    UnsupportedLogLevel(String),
    /// A numeric variable could not be parsed.
    InvalidNumber { variable: &'static str, value: String },
    /// A switch is not one of `true|false|1|0|yes|no|on|off`.
    InvalidSwitch { variable: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLogLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidNumber { variable, value } => {
                write!(f, "`{variable}` must be a whole number, got `{value}`")
            }
            Self::InvalidSwitch { variable, value } => {
                write!(f, "`{variable}` must be true or false, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parses a level name, case-insensitively; `warning` is accepted.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::UnsupportedLogLevel(other.to_string())),
        }
    }

    /// `debug` for debug builds, `info` for release builds.
    pub fn default_for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Info
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub log_dir: PathBuf,
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the workspace and settings documents.
    pub data_dir: PathBuf,
    pub logging: LoggingConfig,
    pub identity: IdentityConfig,
    /// Lets the process act as the workspace owner without signing in.
    pub local_owner: bool,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let data_dir = value(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let level = match value(ENV_LOG_LEVEL) {
            Some(raw) => LogLevel::parse(&raw)?,
            None => LogLevel::default_for_build(),
        };
        let log_dir = value(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(LOG_DIR_NAME));
        let timeout = match value(ENV_AUTH_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidNumber {
                    variable: ENV_AUTH_TIMEOUT_SECS,
                    value: raw.clone(),
                }
            })?),
            None => DEFAULT_IDENTITY_TIMEOUT,
        };
        let local_owner = match value(ENV_LOCAL_OWNER) {
            Some(raw) => parse_switch(ENV_LOCAL_OWNER, &raw)?,
            None => false,
        };

        Ok(Self {
            data_dir,
            logging: LoggingConfig { level, log_dir },
            identity: IdentityConfig {
                url: value(ENV_IDENTITY_URL),
                api_key: value(ENV_IDENTITY_KEY),
                timeout,
            },
            local_owner,
        })
    }

    /// Replaces the data directory and, unless set explicitly, the log
    /// directory derived from it.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        let previous_default = self.data_dir.join(LOG_DIR_NAME);
        self.data_dir = data_dir.into();
        if self.logging.log_dir == previous_default {
            self.logging.log_dir = self.data_dir.join(LOG_DIR_NAME);
        }
        self
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.data_dir.join(WORKSPACE_FILE_NAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE_NAME)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn parse_switch(variable: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidSwitch {
            variable,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, LogLevel};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.workspace_path(), PathBuf::from("data/pages.json"));
        assert_eq!(config.settings_path(), PathBuf::from("data/settings.json"));
        assert_eq!(config.logging.log_dir, PathBuf::from("data/logs"));
        assert_eq!(config.logging.level, LogLevel::default_for_build());
        assert!(config.identity.url.is_none());
        assert_eq!(config.identity.timeout, Duration::from_secs(10));
        assert!(!config.local_owner);
    }

    #[test]
    fn local_owner_switch_is_parsed() {
        assert!(config_from(&[("NOTESPACE_LOCAL_OWNER", "Yes")]).unwrap().local_owner);
        assert!(!config_from(&[("NOTESPACE_LOCAL_OWNER", "0")]).unwrap().local_owner);
        assert!(matches!(
            config_from(&[("NOTESPACE_LOCAL_OWNER", "maybe")]),
            Err(ConfigError::InvalidSwitch { .. })
        ));
    }

    #[test]
    fn blank_identity_values_count_as_unset() {
        let config = config_from(&[
            ("SUPABASE_URL", "   "),
            ("SUPABASE_KEY", "secret"),
        ])
        .unwrap();
        assert!(config.identity.url.is_none());
        assert_eq!(config.identity.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn level_parses_case_insensitively() {
        let config = config_from(&[("NOTESPACE_LOG_LEVEL", " WARNING ")]).unwrap();
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(
            config_from(&[("NOTESPACE_LOG_LEVEL", "loud")]),
            Err(ConfigError::UnsupportedLogLevel("loud".to_string()))
        );
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = config_from(&[("NOTESPACE_AUTH_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn data_dir_override_moves_derived_log_dir_only() {
        let moved = config_from(&[]).unwrap().with_data_dir("/tmp/ns");
        assert_eq!(moved.logging.log_dir, PathBuf::from("/tmp/ns/logs"));

        let pinned = config_from(&[("NOTESPACE_LOG_DIR", "/var/log/ns")])
            .unwrap()
            .with_data_dir("/tmp/ns");
        assert_eq!(pinned.logging.log_dir, PathBuf::from("/var/log/ns"));
    }
}
