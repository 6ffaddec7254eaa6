//! Notification payloads and publish validation

use crate::http::utils::{json_response, Resp};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};

/// One notification as delivered to subscribers.
///
/// Field casing on the wire is `userId`, `title`, `time`, `read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub user_id: String,
    pub title: String,
    /// RFC 3339 timestamp
    pub time: String,
    pub read: bool,
}

/// Body of the internal publish call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub time: Option<String>,
    pub read: Option<bool>,
}

impl PublishRequest {
    pub fn new(user_id: &str, title: &str) -> Self {
        Self { user_id: Some(user_id.to_string()), title: Some(title.to_string()), ..Default::default() }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("userId required")]
    MissingUserId,

    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error("invalid internal key")]
    Unauthorized,

    #[error("body exceeds {0} bytes")]
    PayloadTooLarge(usize),
}

impl PublishError {
    pub fn status(&self) -> StatusCode {
        match self {
            PublishError::MissingUserId | PublishError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            PublishError::Unauthorized => StatusCode::UNAUTHORIZED,
            PublishError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn into_response(self) -> Resp {
        json_response(self.status(), &serde_json::json!({ "error": self.to_string() }))
    }
}

impl Notification {
    /// Apply defaults: `time` now (UTC), `read` false, `title` empty
    pub fn from_request(req: PublishRequest) -> Result<Self, PublishError> {
        let user_id = req
            .user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(PublishError::MissingUserId)?;

        let time = req
            .time
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true));

        Ok(Self { user_id, title: req.title.unwrap_or_default(), time, read: req.read.unwrap_or(false) })
    }
}
