//! Supported locales

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Env: EVT_LOCALES (comma-separated)
    pub supported: Vec<String>,
    /// Env: EVT_DEFAULT_LOCALE
    pub default: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self { supported: vec!["ro".to_string(), "en".to_string()], default: "ro".to_string() }
    }
}

impl LocaleConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(list) = env::var("EVT_LOCALES") {
            let list = super::parse_env_list(&list);
            if !list.is_empty() {
                self.supported = list;
            }
        }
        if let Ok(default) = env::var("EVT_DEFAULT_LOCALE") {
            self.default = default;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.supported.is_empty() {
            bail!("Invalid locales: at least one supported locale is required");
        }
        for locale in &self.supported {
            if locale.is_empty() || locale.contains('/') {
                bail!("Invalid locale {:?}: must be a single path segment", locale);
            }
        }
        if !self.supported.contains(&self.default) {
            bail!("Invalid default locale {:?}: not in supported list", self.default);
        }
        Ok(())
    }
}
