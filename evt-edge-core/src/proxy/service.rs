//! Downstream services and their configured base URLs

use crate::config::ServicesConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Auth,
    Users,
    Events,
    Providers,
    Notifications,
    Modules,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::Auth,
        ServiceKind::Users,
        ServiceKind::Events,
        ServiceKind::Providers,
        ServiceKind::Notifications,
        ServiceKind::Modules,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Auth => "auth",
            ServiceKind::Users => "users",
            ServiceKind::Events => "events",
            ServiceKind::Providers => "providers",
            ServiceKind::Notifications => "notifications",
            ServiceKind::Modules => "modules",
        }
    }

    /// Environment variable overriding the base URL
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceKind::Auth => "AUTH_INTERNAL_URL",
            ServiceKind::Users => "USERS_INTERNAL_URL",
            ServiceKind::Events => "EVENTS_INTERNAL_URL",
            ServiceKind::Providers => "PROVIDERS_INTERNAL_URL",
            ServiceKind::Notifications => "NOTIFICATIONS_INTERNAL_URL",
            ServiceKind::Modules => "MODULES_INTERNAL_URL",
        }
    }

    /// Development default
    pub fn default_url(&self) -> &'static str {
        match self {
            ServiceKind::Auth => "http://localhost:4001",
            ServiceKind::Users => "http://localhost:4002",
            ServiceKind::Events => "http://localhost:4003",
            ServiceKind::Providers => "http://localhost:4004",
            ServiceKind::Notifications => "http://localhost:4005",
            ServiceKind::Modules => "http://localhost:4006",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown service {:?}", s))
    }
}

/// Resolved base URLs, read-only after startup
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    urls: HashMap<ServiceKind, String>,
}

impl ServiceRegistry {
    pub fn from_config(config: &ServicesConfig) -> Self {
        let mut registry = Self::default();
        for kind in ServiceKind::ALL {
            registry.set(kind, config.get(kind).map(str::to_string));
        }
        registry
    }

    /// Set or clear a base URL; an empty value clears it
    pub fn set(&mut self, kind: ServiceKind, url: Option<String>) {
        match url.map(|u| u.trim().trim_end_matches('/').to_string()).filter(|u| !u.is_empty()) {
            Some(url) => {
                self.urls.insert(kind, url);
            }
            None => {
                self.urls.remove(&kind);
            }
        }
    }

    pub fn with(mut self, kind: ServiceKind, url: impl Into<String>) -> Self {
        self.set(kind, Some(url.into()));
        self
    }

    /// Base URL without trailing slash
    pub fn base_url(&self, kind: ServiceKind) -> Option<&str> {
        self.urls.get(&kind).map(String::as_str)
    }
}
