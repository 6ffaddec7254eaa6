//! BFF proxy configuration

use crate::proxy::ServiceKind;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Extra proxy route declared in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRouteConfig {
    /// UI-facing prefix, e.g. `/api/venues`
    pub base_path: String,
    pub service: ServiceKind,
    /// Internal path the prefix maps to, e.g. `/venues`
    pub upstream_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Whole-request upstream timeout
    /// Env: EVT_PROXY_TIMEOUT_SECS
    /// Default: 30
    pub timeout_secs: u64,

    /// TCP connect timeout
    /// Env: EVT_PROXY_CONNECT_TIMEOUT_SECS
    /// Default: 5
    pub connect_timeout_secs: u64,

    /// Include the failure detail and target URL in 502 bodies.
    /// Turn off in hardened deployments; the detail is still logged.
    /// Env: EVT_PROXY_EXPOSE_DIAGNOSTICS
    /// Default: true
    pub expose_diagnostics: bool,

    /// Routes added after the built-in table
    pub routes: Vec<ProxyRouteConfig>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self { timeout_secs: 30, connect_timeout_secs: 5, expose_diagnostics: true, routes: vec![] }
    }
}

impl ProxyConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(timeout) = env::var("EVT_PROXY_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }
        if let Ok(timeout) = env::var("EVT_PROXY_CONNECT_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.connect_timeout_secs = t;
            }
        }
        if let Ok(expose) = env::var("EVT_PROXY_EXPOSE_DIAGNOSTICS") {
            self.expose_diagnostics = super::parse_env_bool(&expose);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("Invalid proxy timeout_secs: must be greater than 0");
        }
        if self.connect_timeout_secs == 0 {
            bail!("Invalid proxy connect_timeout_secs: must be greater than 0");
        }
        for route in &self.routes {
            if !route.base_path.starts_with("/api/") {
                bail!("Invalid proxy route {:?}: base_path must live under /api/", route.base_path);
            }
            if !route.upstream_path.starts_with('/') {
                bail!(
                    "Invalid proxy route {:?}: upstream_path must start with '/'",
                    route.base_path
                );
            }
        }
        Ok(())
    }
}
