//! Logging configuration

use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Env: EVT_LOG_LEVEL
    pub level: String,
    /// `json`, `human` or `logfmt`
    /// Env: EVT_LOG_FORMAT
    pub format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "json".to_string() }
    }
}

impl LogSettings {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(level) = env::var("EVT_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = env::var("EVT_LOG_FORMAT") {
            self.format = format;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.to_logging_config().map(|_| ())
    }

    /// Build the runtime logger configuration
    pub fn to_logging_config(&self) -> Result<LoggingConfig> {
        let level: LogLevel = self.level.parse().map_err(|e: String| anyhow!(e))?;
        let format: LogFormat = self.format.parse().map_err(|e: String| anyhow!(e))?;
        Ok(LoggingConfig::production()
            .with_level(level)
            .with_format(format)
            .with_context_field("service", "evt-edge"))
    }
}
