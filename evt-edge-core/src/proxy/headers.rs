//! Header scrubbing between the edge and internal services

use hyper::header::{HeaderMap, HeaderName, CONNECTION, CONTENT_LENGTH, COOKIE, HOST};

/// Headers that describe a single connection and must not be forwarded
pub const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Header names listed in `Connection`, lowercased
fn connection_tokens(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn copy_filtered(source: &HeaderMap, skip: impl Fn(&HeaderName) -> bool) -> HeaderMap {
    let named = connection_tokens(source);
    let mut out = HeaderMap::with_capacity(source.len());
    for (name, value) in source {
        if is_hop_by_hop(name) || named.iter().any(|n| n == name.as_str()) || skip(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Inbound headers safe to send upstream.
///
/// Drops hop-by-hop headers, `Host`, `Content-Length` and `Cookie`: internal
/// services only see the derived bearer token, never the browser cookies.
pub fn outbound_request_headers(inbound: &HeaderMap) -> HeaderMap {
    copy_filtered(inbound, |name| *name == HOST || *name == CONTENT_LENGTH || *name == COOKIE)
}

/// Like [`outbound_request_headers`] but keeps cookies, for page relays
pub fn page_request_headers(inbound: &HeaderMap) -> HeaderMap {
    copy_filtered(inbound, |name| *name == HOST || *name == CONTENT_LENGTH)
}

/// Upstream response headers relayed to the client
pub fn relayed_response_headers(upstream: &HeaderMap) -> HeaderMap {
    copy_filtered(upstream, |name| *name == CONTENT_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, TRANSFER_ENCODING};

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("edge.example.ro"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(COOKIE, HeaderValue::from_static("evt_session=abc"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive, x-debug-trace"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-debug-trace", HeaderValue::from_static("1"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("12"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        headers
    }

    #[test]
    fn test_outbound_strips_cookie_and_hop_by_hop() {
        let out = outbound_request_headers(&inbound());
        assert!(out.get(COOKIE).is_none());
        assert!(out.get(HOST).is_none());
        assert!(out.get(CONNECTION).is_none());
        assert!(out.get("keep-alive").is_none());
        assert!(out.get("x-debug-trace").is_none());
        assert!(out.get(CONTENT_LENGTH).is_none());
        assert_eq!(out[ACCEPT], "application/json");
        assert_eq!(out[AUTHORIZATION], "Bearer t");
    }

    #[test]
    fn test_page_headers_keep_cookie() {
        let out = page_request_headers(&inbound());
        assert_eq!(out[COOKIE], "evt_session=abc");
        assert!(out.get(HOST).is_none());
    }

    #[test]
    fn test_response_headers() {
        let mut upstream = HeaderMap::new();
        upstream.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        upstream.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        upstream.insert(CONTENT_LENGTH, HeaderValue::from_static("2"));
        let out = relayed_response_headers(&upstream);
        assert_eq!(out.len(), 1);
        assert_eq!(out[CONTENT_TYPE], "application/json");
    }
}
