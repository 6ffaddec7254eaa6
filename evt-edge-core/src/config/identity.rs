//! Identity cookies and bearer-token lookup

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub role_cookie: String,
    pub session_cookie: String,
    /// Role assumed when the role cookie is absent or rejected
    pub default_role: String,
    /// When set, role cookies must carry an HMAC-SHA256 signature.
    /// Env: EVT_ROLE_COOKIE_SECRET
    pub role_cookie_secret: Option<String>,
    /// Cookies scanned, in order, for a bearer token
    pub token_cookies: Vec<String>,
    pub csrf_cookie: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            role_cookie: "evt_role".to_string(),
            session_cookie: "evt_session".to_string(),
            default_role: "client".to_string(),
            role_cookie_secret: None,
            token_cookies: ["evt_token", "access_token", "token", "evt_session"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            csrf_cookie: "evt_csrf".to_string(),
        }
    }
}

impl IdentityConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(secret) = env::var("EVT_ROLE_COOKIE_SECRET") {
            self.role_cookie_secret = if secret.is_empty() { None } else { Some(secret) };
        }
    }

    pub fn validate(&self) -> Result<()> {
        for name in [&self.role_cookie, &self.session_cookie, &self.csrf_cookie] {
            if name.is_empty() || name.contains(['=', ';', ' ']) {
                bail!("Invalid cookie name {:?}", name);
            }
        }
        if self.default_role.is_empty() {
            bail!("Invalid default_role: cannot be empty");
        }
        if self.token_cookies.is_empty() {
            bail!("Invalid token_cookies: at least one cookie name is required");
        }
        if let Some(secret) = &self.role_cookie_secret {
            if secret.len() < 16 {
                bail!("Invalid role_cookie_secret: must be at least 16 bytes");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cookie_order() {
        let cfg = IdentityConfig::default();
        assert_eq!(cfg.token_cookies.first().map(String::as_str), Some("evt_token"));
        assert_eq!(cfg.token_cookies.last().map(String::as_str), Some("evt_session"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let cfg =
            IdentityConfig { role_cookie_secret: Some("short".to_string()), ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bad_cookie_name_rejected() {
        let cfg = IdentityConfig { role_cookie: "evt role".to_string(), ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
