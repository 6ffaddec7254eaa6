//! HTTP helpers shared by the edge pipeline
//!
//! Response constructors here never panic: header values are either static
//! or validated, with a safe fallback.

use bytes::Bytes;
use http_body::Body;
use http_body_util::{combinators::BoxBody, BodyExt, Empty, Full, LengthLimitError, Limited};
use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Response body used by every edge response
pub type RespBody = BoxBody<Bytes, Infallible>;
pub type Resp = Response<RespBody>;

/// Boxed error accepted from inbound request bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to buffer a request body
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BodyReadError {
    #[error("body exceeds {0} bytes")]
    TooLarge(usize),

    #[error("unreadable body: {0}")]
    Unreadable(String),
}

/// Buffer a request body, refusing anything over `limit` bytes
pub async fn read_body_limited<B>(body: B, limit: usize) -> Result<Bytes, BodyReadError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(BodyReadError::TooLarge(limit)),
        Err(e) => Err(BodyReadError::Unreadable(e.to_string())),
    }
}

/// Peer address of the connection a request arrived on.
///
/// Inserted into request extensions by the server loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub SocketAddr);

/// Create a response body from any data that can be converted to Bytes
pub fn body_from<T: Into<Bytes>>(data: T) -> RespBody {
    Full::new(data.into()).boxed()
}

pub fn empty_body() -> RespBody {
    Empty::<Bytes>::new().boxed()
}

/// JSON response with the given status
pub fn json_response(status: StatusCode, value: &serde_json::Value) -> Resp {
    let mut resp = Response::new(body_from(value.to_string()));
    *resp.status_mut() = status;
    resp.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

/// JSON error envelope `{"error": ..}`
pub fn json_error_response(status: StatusCode, error: &str) -> Resp {
    json_response(status, &serde_json::json!({ "error": error }))
}

/// Standard 404 for unmatched routes
pub fn not_found_response() -> Resp {
    json_error_response(StatusCode::NOT_FOUND, "not_found")
}

/// Redirect to `location` with an empty body.
///
/// A location that is not a valid header value falls back to `/`.
pub fn redirect_response(status: StatusCode, location: &str) -> Resp {
    let mut resp = Response::new(empty_body());
    *resp.status_mut() = status;
    let location = HeaderValue::from_str(location).unwrap_or_else(|_| HeaderValue::from_static("/"));
    resp.headers_mut().insert(LOCATION, location);
    resp
}

/// Path plus query of a request, as sent by the client
pub fn path_and_query<T>(req: &Request<T>) -> String {
    req.uri().path_and_query().map(|pq| pq.as_str().to_string()).unwrap_or_else(|| "/".to_string())
}

/// Look up a query parameter, percent-decoded
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != name {
            return None;
        }
        let value = value.replace('+', " ");
        Some(urlencoding::decode(&value).map(|v| v.into_owned()).unwrap_or(value))
    })
}

/// Extract client IP from proxy headers (`X-Forwarded-For`, `X-Real-IP`).
///
/// These headers are trivially spoofed by clients. Use [`resolve_client_ip`]
/// to only trust them behind a loopback or private-network proxy.
pub fn extract_client_ip<T>(req: &Request<T>) -> Option<String> {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let trimmed = first_ip.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            let trimmed = ip_str.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }

    None
}

/// Resolve the real client IP.
///
/// Proxy headers are trusted only when `remote_addr` is a loopback or
/// private address.
pub fn resolve_client_ip<T>(req: &Request<T>, remote_addr: SocketAddr) -> String {
    let ip = remote_addr.ip();
    let is_trusted_proxy = ip.is_loopback()
        || match ip {
            std::net::IpAddr::V4(v4) => v4.is_private(),
            std::net::IpAddr::V6(_) => false,
        };

    if is_trusted_proxy {
        extract_client_ip(req).unwrap_or_else(|| ip.to_string())
    } else {
        ip.to_string()
    }
}

/// Escape a string for safe inclusion in a JSON value.
///
/// Handles `"`, `\`, and control characters (U+0000–U+001F).
fn escape_json_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Log one access line in structured JSON.
///
/// Generic over the response body type; only reads status and headers.
pub fn log_access_ip<B>(
    remote_ip: &str,
    method: &str,
    path: &str,
    resp: &Response<B>,
    start: std::time::Instant,
) {
    let status = resp.status().as_u16();
    let location = resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()).unwrap_or("-");
    let dur_ms = start.elapsed().as_millis();
    log::info!(
        "{{\"remote\":\"{}\",\"method\":\"{}\",\"path\":\"{}\",\"status\":{},\"location\":\"{}\",\"dur_ms\":{}}}",
        escape_json_value(remote_ip),
        escape_json_value(method),
        escape_json_value(path),
        status,
        escape_json_value(location),
        dur_ms
    );
}
