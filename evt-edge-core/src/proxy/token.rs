//! Bearer token derivation

use crate::http::CookieJar;
use hyper::header::{HeaderMap, AUTHORIZATION};

/// Token from an explicit `Authorization: Bearer` header, else from the
/// first non-empty cookie among `cookie_names`, in order.
pub fn derive_bearer(
    headers: &HeaderMap,
    cookies: &CookieJar,
    cookie_names: &[String],
) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|t| !t.is_empty());

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    cookie_names.iter().find_map(|name| cookies.get_non_empty(name)).map(str::to_string)
}
