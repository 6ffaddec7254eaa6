//! Page renderer behind the edge

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Origin that renders allowed page requests.
    /// Without it, allowed page requests answer 404.
    /// Env: EVT_FRONTEND_URL
    pub upstream_url: Option<String>,
}

impl FrontendConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(url) = env::var("EVT_FRONTEND_URL") {
            self.upstream_url = if url.is_empty() { None } else { Some(url) };
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.upstream_url {
            if let Err(e) = url.parse::<reqwest::Url>() {
                bail!("Invalid frontend upstream_url {:?}: {}", url, e);
            }
        }
        Ok(())
    }
}
