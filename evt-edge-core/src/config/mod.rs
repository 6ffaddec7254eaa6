//! Configuration system for evt-edge
//!
//! Configuration values are resolved in the following order (highest priority wins):
//!
//! 1. **Code** (builder methods on [`crate::app::EdgeServer`])
//! 2. **Environment variables** (`EVT_*`, `*_INTERNAL_URL`)
//! 3. **Config file** (`evt-edge.toml`)
//! 4. **Defaults**
//!
//! Every section is `#[serde(default)]`, so a config file only needs the
//! keys it changes.
//!
//! # Example
//!
//! ```no_run
//! use evt_edge_core::config::EdgeConfig;
//!
//! let config = EdgeConfig::load()?;
//! config.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod access;
pub mod dev;
pub mod frontend;
pub mod identity;
pub mod locales;
pub mod logging;
pub mod notifications;
pub mod proxy;
pub mod security;
pub mod server;
pub mod services;

pub use access::{AccessConfig, RoleRouteConfig};
pub use dev::DevConfig;
pub use frontend::FrontendConfig;
pub use identity::IdentityConfig;
pub use locales::LocaleConfig;
pub use logging::LogSettings;
pub use notifications::NotificationsConfig;
pub use proxy::{ProxyConfig, ProxyRouteConfig};
pub use security::SecurityConfig;
pub use server::ServerConfig;
pub use services::ServicesConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name looked up by [`EdgeConfig::load`]
pub const DEFAULT_CONFIG_FILE: &str = "evt-edge.toml";

/// Parse a boolean environment value (`1`, `true`, `yes`, `on`)
pub(crate) fn parse_env_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Split a comma-separated environment value, dropping empty items
pub(crate) fn parse_env_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).map(|s| s.to_string()).collect()
}

/// Complete edge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub server: ServerConfig,
    pub locales: LocaleConfig,
    pub access: AccessConfig,
    pub identity: IdentityConfig,
    pub services: ServicesConfig,
    pub proxy: ProxyConfig,
    pub notifications: NotificationsConfig,
    pub security: SecurityConfig,
    pub frontend: FrontendConfig,
    pub dev: DevConfig,
    pub logging: LogSettings,
}

impl EdgeConfig {
    /// Load configuration with full supersedence chain
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (`evt-edge.toml`)
    /// 3. Defaults
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file, if it exists
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.server.merge(other.server);
        self.locales.merge(other.locales);
        self.access.merge(other.access);
        self.identity.merge(other.identity);
        self.services.merge(other.services);
        self.proxy.merge(other.proxy);
        self.notifications.merge(other.notifications);
        self.security.merge(other.security);
        self.frontend.merge(other.frontend);
        self.dev.merge(other.dev);
        self.logging.merge(other.logging);
    }

    /// Apply environment variables to configuration
    pub fn apply_env_vars(&mut self) {
        self.server.apply_env_vars();
        self.locales.apply_env_vars();
        self.identity.apply_env_vars();
        self.services.apply_env_vars();
        self.proxy.apply_env_vars();
        self.notifications.apply_env_vars();
        self.frontend.apply_env_vars();
        self.dev.apply_env_vars();
        self.logging.apply_env_vars();
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.locales.validate()?;
        self.access.validate()?;
        self.identity.validate()?;
        self.services.validate()?;
        self.proxy.validate()?;
        self.notifications.validate()?;
        self.security.validate()?;
        self.frontend.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
