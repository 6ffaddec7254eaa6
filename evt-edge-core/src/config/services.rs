//! Internal service base URLs

use crate::proxy::ServiceKind;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// One internal base URL per downstream service.
///
/// Each is overridable by `<SERVICE>_INTERNAL_URL`; setting the variable to
/// an empty string un-configures the service, and requests routed to it
/// answer 500 "internal base URL missing".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub auth: Option<String>,
    pub users: Option<String>,
    pub events: Option<String>,
    pub providers: Option<String>,
    pub notifications: Option<String>,
    pub modules: Option<String>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            auth: Some(ServiceKind::Auth.default_url().to_string()),
            users: Some(ServiceKind::Users.default_url().to_string()),
            events: Some(ServiceKind::Events.default_url().to_string()),
            providers: Some(ServiceKind::Providers.default_url().to_string()),
            notifications: Some(ServiceKind::Notifications.default_url().to_string()),
            modules: Some(ServiceKind::Modules.default_url().to_string()),
        }
    }
}

impl ServicesConfig {
    /// Configuration with every service unset
    pub fn empty() -> Self {
        Self {
            auth: None,
            users: None,
            events: None,
            providers: None,
            notifications: None,
            modules: None,
        }
    }

    pub fn get(&self, kind: ServiceKind) -> Option<&str> {
        self.slot(kind).as_deref().filter(|url| !url.is_empty())
    }

    pub fn set(&mut self, kind: ServiceKind, url: Option<String>) {
        *self.slot_mut(kind) = url.filter(|u| !u.is_empty());
    }

    fn slot(&self, kind: ServiceKind) -> &Option<String> {
        match kind {
            ServiceKind::Auth => &self.auth,
            ServiceKind::Users => &self.users,
            ServiceKind::Events => &self.events,
            ServiceKind::Providers => &self.providers,
            ServiceKind::Notifications => &self.notifications,
            ServiceKind::Modules => &self.modules,
        }
    }

    fn slot_mut(&mut self, kind: ServiceKind) -> &mut Option<String> {
        match kind {
            ServiceKind::Auth => &mut self.auth,
            ServiceKind::Users => &mut self.users,
            ServiceKind::Events => &mut self.events,
            ServiceKind::Providers => &mut self.providers,
            ServiceKind::Notifications => &mut self.notifications,
            ServiceKind::Modules => &mut self.modules,
        }
    }

    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        for kind in ServiceKind::ALL {
            if let Ok(url) = env::var(kind.env_var()) {
                self.set(kind, Some(url.trim().to_string()));
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for kind in ServiceKind::ALL {
            if let Some(url) = self.get(kind) {
                let parsed: reqwest::Url = match url.parse() {
                    Ok(u) => u,
                    Err(e) => bail!("Invalid {} URL {:?}: {}", kind.env_var(), url, e),
                };
                if !matches!(parsed.scheme(), "http" | "https") {
                    bail!("Invalid {} URL {:?}: scheme must be http or https", kind.env_var(), url);
                }
            }
        }
        Ok(())
    }
}
