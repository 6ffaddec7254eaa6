//! Proxy failures and their JSON envelopes

use crate::http::utils::{json_response, Resp};
use crate::proxy::ServiceKind;
use bytes::Bytes;
use hyper::StatusCode;
use serde_json::{json, Value};

#[derive(thiserror::Error, Debug)]
pub enum ProxyError {
    /// No base URL configured for the target service
    #[error("internal base URL missing for {0}")]
    ConfigurationMissing(ServiceKind),

    /// No bearer token could be derived from the request
    #[error("Unauthorized (no token)")]
    Unauthorized,

    /// Transport failure: refused, reset, DNS, timeout
    #[error("upstream unreachable: {target}: {detail}")]
    UpstreamUnreachable { target: String, detail: String },

    /// The upstream answered with an error status
    #[error("upstream error {status}")]
    Upstream { status: StatusCode, body: Bytes },

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),
}

/// Upstream error body as JSON when it parses, as a string otherwise
fn upstream_body_value(body: &Bytes) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::ConfigurationMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// JSON body sent to the client.
    ///
    /// With `expose_diagnostics` off, 502 bodies omit the failure detail and
    /// the target URL.
    pub fn body(&self, expose_diagnostics: bool) -> Value {
        match self {
            ProxyError::ConfigurationMissing(service) => {
                json!({ "error": "internal base URL missing", "service": service.as_str() })
            }
            ProxyError::Unauthorized => json!({ "error": "Unauthorized (no token)" }),
            ProxyError::UpstreamUnreachable { target, detail } => {
                if expose_diagnostics {
                    json!({ "error": "upstream unreachable", "detail": detail, "target": target })
                } else {
                    json!({ "error": "upstream unreachable" })
                }
            }
            ProxyError::Upstream { status, body } => json!({
                "error": "upstream error",
                "upstreamStatus": status.as_u16(),
                "upstreamBody": upstream_body_value(body),
            }),
            ProxyError::NotFound => json!({ "error": "not_found" }),
            ProxyError::BadRequest(message) => json!({ "error": message }),
        }
    }

    pub fn into_response(self, expose_diagnostics: bool) -> Resp {
        json_response(self.status(), &self.body(expose_diagnostics))
    }
}
