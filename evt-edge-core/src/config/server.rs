//! Server configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Default cap on buffered request bodies (10MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening address
    /// Env: EVT_HOST
    /// Default: "127.0.0.1"
    pub host: String,

    /// Listening port
    /// Env: EVT_PORT
    /// Default: 3000
    pub port: u16,

    /// Upper bound on a single connection's lifetime, in seconds.
    /// Notification streams are long-lived, so this is off unless set.
    /// Env: EVT_CONNECTION_TIMEOUT_SECS
    /// Default: None
    pub connection_timeout_secs: Option<u64>,

    /// Emit one structured access-log line per request
    /// Env: EVT_ACCESS_LOG
    /// Default: true
    pub access_log: bool,

    /// Largest request body the edge buffers itself (publish, dev sign-in).
    /// Proxied bodies are streamed and not capped here.
    /// Env: EVT_MAX_BODY_SIZE
    /// Default: 10MB
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            connection_timeout_secs: None,
            access_log: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ServerConfig {
    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    /// Apply environment variables
    pub fn apply_env_vars(&mut self) {
        if let Ok(host) = env::var("EVT_HOST") {
            self.host = host;
        }

        if let Ok(port) = env::var("EVT_PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }

        if let Ok(timeout) = env::var("EVT_CONNECTION_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.connection_timeout_secs = Some(t);
            }
        }

        if let Ok(enabled) = env::var("EVT_ACCESS_LOG") {
            self.access_log = super::parse_env_bool(&enabled);
        }

        if let Ok(size) = env::var("EVT_MAX_BODY_SIZE") {
            if let Ok(s) = size.parse() {
                self.max_body_size = s;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            bail!("Invalid host: host cannot be empty");
        }

        if self.connection_timeout_secs == Some(0) {
            bail!("Invalid connection_timeout_secs: must be greater than 0 when set");
        }

        if self.max_body_size == 0 {
            bail!("Invalid max_body_size: must be greater than 0");
        }

        Ok(())
    }

    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
