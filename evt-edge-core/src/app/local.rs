//! Endpoints answered by the edge itself: health and mock sign-in

use crate::config::server::DEFAULT_MAX_BODY_SIZE;
use crate::config::IdentityConfig;
use crate::guard::sign_role;
use crate::http::utils::{
    json_error_response, json_response, read_body_limited, BodyReadError, BoxError, Resp,
};
use crate::http::SetCookie;
use crate::notify::NotificationBus;
use bytes::Bytes;
use http_body::Body;
use hyper::header::{HeaderValue, SET_COOKIE};
use hyper::{Request, StatusCode};
use serde::Deserialize;

pub const HEALTH_PATH: &str = "/api/health";
pub const DEV_SIGN_IN_PATH: &str = "/api/dev/sign-in";
pub const DEV_SIGN_OUT_PATH: &str = "/api/dev/sign-out";

pub fn health(bus: &NotificationBus) -> Resp {
    json_response(
        StatusCode::OK,
        &serde_json::json!({ "status": "ok", "subscribers": bus.subscriber_count() }),
    )
}

pub fn method_not_allowed() -> Resp {
    json_error_response(StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed")
}

#[derive(Debug, Default, Deserialize)]
struct SignInRequest {
    role: Option<String>,
}

fn valid_role(role: &str) -> bool {
    !role.is_empty()
        && role.len() <= 32
        && role.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn append_cookie(resp: &mut Resp, cookie: &SetCookie) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_header_value()) {
        resp.headers_mut().append(SET_COOKIE, value);
    }
}

/// Mock sign-in for development: issues a random session cookie and the
/// requested role cookie (signed when a secret is configured).
pub struct DevAuth {
    identity: IdentityConfig,
    max_body_size: usize,
}

impl DevAuth {
    pub fn new(identity: &IdentityConfig) -> Self {
        Self { identity: identity.clone(), max_body_size: DEFAULT_MAX_BODY_SIZE }
    }

    pub fn with_max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    pub async fn sign_in<B>(&self, req: Request<B>) -> Resp
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let body = match read_body_limited(req.into_body(), self.max_body_size).await {
            Ok(body) => body,
            Err(BodyReadError::TooLarge(_)) => {
                return json_error_response(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
            }
            Err(BodyReadError::Unreadable(_)) => {
                return json_error_response(StatusCode::BAD_REQUEST, "unreadable body")
            }
        };
        let request: SignInRequest = if body.is_empty() {
            SignInRequest::default()
        } else {
            match serde_json::from_slice(&body) {
                Ok(r) => r,
                Err(_) => return json_error_response(StatusCode::BAD_REQUEST, "invalid JSON body"),
            }
        };

        let role = request
            .role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| self.identity.default_role.clone());
        if !valid_role(&role) {
            return json_error_response(StatusCode::BAD_REQUEST, "invalid role");
        }

        let role_value = match self.identity.role_cookie_secret.as_deref() {
            Some(secret) if !secret.is_empty() => match sign_role(secret.as_bytes(), &role) {
                Ok(signed) => signed,
                Err(e) => {
                    log::error!("dev sign-in: {}", e);
                    return json_error_response(StatusCode::INTERNAL_SERVER_ERROR, "signing failed");
                }
            },
            _ => role.clone(),
        };
        let session = uuid::Uuid::new_v4().simple().to_string();

        let mut resp = json_response(StatusCode::OK, &serde_json::json!({ "ok": true, "role": role }));
        append_cookie(&mut resp, &SetCookie::new(&self.identity.session_cookie, session).with_http_only(true));
        append_cookie(&mut resp, &SetCookie::new(&self.identity.role_cookie, role_value));
        log::info!("dev sign-in as role={}", role);
        resp
    }

    pub fn sign_out(&self) -> Resp {
        let mut resp = json_response(StatusCode::OK, &serde_json::json!({ "ok": true }));
        append_cookie(&mut resp, &SetCookie::expired(&self.identity.session_cookie).with_http_only(true));
        append_cookie(&mut resp, &SetCookie::expired(&self.identity.role_cookie));
        resp
    }
}
