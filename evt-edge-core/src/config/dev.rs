//! Development-only switches

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// Expose `/api/dev/sign-in` and `/api/dev/sign-out`
    /// Env: EVT_DEV_MOCK_AUTH
    pub mock_auth: bool,
}

impl DevConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(enabled) = env::var("EVT_DEV_MOCK_AUTH") {
            self.mock_auth = super::parse_env_bool(&enabled);
        }
    }
}
