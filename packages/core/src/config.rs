//! Gateway Configuration
//!
//! Plugin-style configuration block controlling whether the gateway starts
//! and how verbose it is. The log level never changes behavior.
//!
//! ```json
//! { "enabled": true, "logLevel": "debug", "port": 3100 }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default HTTP port for the MCP endpoint
pub const DEFAULT_MCP_PORT: u16 = 3100;

pub const ENV_ENABLED: &str = "CONTENT_MCP_ENABLED";
pub const ENV_LOG_LEVEL: &str = "CONTENT_MCP_LOG_LEVEL";
pub const ENV_PORT: &str = "MCP_PORT";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid logLevel \"{0}\". Must be one of: error, warn, info, debug, trace")]
    InvalidLogLevel(String),

    #[error("Invalid value {value:?} for {name}")]
    InvalidValue { name: String, value: String },

    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Verbosity levels, ordered from least to most verbose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Whether a message at `level` passes this threshold
    pub fn allows(&self, level: LogLevel) -> bool {
        level <= *self
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidLogLevel(s.to_string()))
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, ConfigError> {
        value.parse()
    }
}

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    /// Gates whether the gateway initializes at all
    pub enabled: bool,

    /// Verbosity of the gateway's logging context
    pub log_level: LogLevel,

    /// HTTP port for the MCP endpoint
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: LogLevel::Info,
            port: DEFAULT_MCP_PORT,
        }
    }
}

impl GatewayConfig {
    /// Parse a JSON configuration block, filling missing keys with defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = serde_json::from_str(json)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load configuration from process environment variables
    ///
    /// - `CONTENT_MCP_ENABLED` - `true`/`false` (also `1`/`0`)
    /// - `CONTENT_MCP_LOG_LEVEL` - one of error, warn, info, debug, trace
    /// - `MCP_PORT` - HTTP port (default 3100)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = GatewayConfig::default();

        if let Some(value) = lookup(ENV_ENABLED) {
            config.enabled = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_ENABLED.to_string(),
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.log_level = value.trim().parse()?;
        }

        if let Some(value) = lookup(ENV_PORT) {
            config.port = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_PORT.to_string(),
                value: value.clone(),
            })?;
        }

        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be greater than 0".to_string());
        }

        Ok(())
    }
}
