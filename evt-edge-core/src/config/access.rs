//! Route access policy: excluded paths, role-gated and session-gated prefixes

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One row of the role route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRouteConfig {
    /// First path segment after the locale, without slashes (e.g. `admin`)
    pub prefix: String,
    pub roles: Vec<String>,
}

impl RoleRouteConfig {
    pub fn new(prefix: &str, roles: &[&str]) -> Self {
        Self { prefix: prefix.to_string(), roles: roles.iter().map(|r| r.to_string()).collect() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Path prefixes that bypass locale and access policy
    pub excluded_prefixes: Vec<String>,
    /// Ordered; first exact match wins
    pub role_routes: Vec<RoleRouteConfig>,
    pub session_prefixes: Vec<String>,
    /// Target of role-mismatch redirects, below the locale
    pub dashboard_path: String,
    /// Target of missing-session redirects, below the locale
    pub login_path: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: ["/api", "/_next", "/_vercel", "/static", "/assets"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            role_routes: vec![
                RoleRouteConfig::new("admin", &["admin"]),
                RoleRouteConfig::new("provider", &["provider", "admin"]),
            ],
            session_prefixes: [
                "dashboard",
                "admin",
                "provider",
                "events",
                "profile",
                "notifications",
                "settings",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            dashboard_path: "/dashboard".to_string(),
            login_path: "/login".to_string(),
        }
    }
}

impl AccessConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn validate(&self) -> Result<()> {
        for prefix in &self.excluded_prefixes {
            if !prefix.starts_with('/') {
                bail!("Invalid excluded prefix {:?}: must start with '/'", prefix);
            }
        }
        for rule in &self.role_routes {
            if rule.prefix.is_empty() || rule.prefix.contains('/') {
                bail!("Invalid role route prefix {:?}: must be a single path segment", rule.prefix);
            }
            if rule.roles.is_empty() {
                bail!("Role route {:?} allows no role", rule.prefix);
            }
        }
        for path in [&self.dashboard_path, &self.login_path] {
            if !path.starts_with('/') {
                bail!("Invalid redirect path {:?}: must start with '/'", path);
            }
        }
        Ok(())
    }
}
