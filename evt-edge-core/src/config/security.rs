//! Security header configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Values for the fixed security header set.
///
/// The CSP source lists are enumerated allow-lists; `default-src`,
/// `frame-ancestors`, `base-uri` and `form-action` are fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub strict_transport_security: String,
    pub permissions_policy: String,
    pub script_src: Vec<String>,
    pub style_src: Vec<String>,
    pub img_src: Vec<String>,
    pub font_src: Vec<String>,
    pub connect_src: Vec<String>,
    /// `Secure` attribute on the CSRF cookie
    pub csrf_cookie_secure: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            strict_transport_security: "max-age=63072000; includeSubDomains; preload".to_string(),
            permissions_policy: "camera=(), microphone=(), geolocation=()".to_string(),
            script_src: strings(&["'self'", "'unsafe-inline'", "https://cdn.jsdelivr.net"]),
            style_src: strings(&["'self'", "'unsafe-inline'", "https://fonts.googleapis.com"]),
            img_src: strings(&["'self'", "data:", "blob:", "https:"]),
            font_src: strings(&["'self'", "data:", "https://fonts.gstatic.com"]),
            connect_src: strings(&["'self'"]),
            csrf_cookie_secure: true,
        }
    }
}

impl SecurityConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn validate(&self) -> Result<()> {
        let lists = [
            ("script_src", &self.script_src),
            ("style_src", &self.style_src),
            ("img_src", &self.img_src),
            ("font_src", &self.font_src),
            ("connect_src", &self.connect_src),
        ];
        for (name, list) in lists {
            if list.is_empty() {
                bail!("Invalid {}: allow-list cannot be empty", name);
            }
            for source in list {
                if source.is_empty() || source.contains([';', ',', '\n', '\r']) {
                    bail!("Invalid {} source {:?}", name, source);
                }
            }
        }
        Ok(())
    }
}
