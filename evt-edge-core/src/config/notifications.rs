//! Notification streaming configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// SSE endpoint
    pub stream_path: String,
    /// Internal publish endpoint
    pub publish_path: String,
    /// Interval between `ping` events
    /// Env: EVT_NOTIFY_HEARTBEAT_SECS
    pub heartbeat_secs: u64,
    /// Shared key expected in `x-internal-key` on publish, if set
    /// Env: EVT_NOTIFY_PUBLISH_KEY
    pub publish_key: Option<String>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            stream_path: "/api/notifications/stream".to_string(),
            publish_path: "/api/notifications/publish".to_string(),
            heartbeat_secs: 25,
            publish_key: None,
        }
    }
}

impl NotificationsConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(secs) = env::var("EVT_NOTIFY_HEARTBEAT_SECS") {
            if let Ok(s) = secs.parse() {
                self.heartbeat_secs = s;
            }
        }
        if let Ok(key) = env::var("EVT_NOTIFY_PUBLISH_KEY") {
            self.publish_key = if key.is_empty() { None } else { Some(key) };
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.heartbeat_secs == 0 {
            bail!("Invalid heartbeat_secs: must be greater than 0");
        }
        for path in [&self.stream_path, &self.publish_path] {
            if !path.starts_with("/api/") {
                bail!("Invalid notification path {:?}: must live under /api/", path);
            }
        }
        if self.stream_path == self.publish_path {
            bail!("stream_path and publish_path must differ");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = NotificationsConfig::default();
        assert_eq!(cfg.heartbeat_secs, 25);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_heartbeat_rejected() {
        let cfg = NotificationsConfig { heartbeat_secs: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
