//! Set-once CSRF cookie

use crate::http::{CookieJar, SameSitePolicy, SetCookie};
use hyper::header::{HeaderMap, HeaderValue, SET_COOKIE};
use rand::RngCore;

/// Issues the CSRF token cookie to clients that do not have one yet.
///
/// The edge only issues the token; comparing it against a header or form
/// field is left to the services behind it.
#[derive(Debug, Clone)]
pub struct CsrfCookie {
    name: String,
    secure: bool,
}

impl CsrfCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self { name: name.into(), secure }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 16 random bytes, hex-encoded
    pub fn generate_token() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    pub fn set_cookie(&self, token: &str) -> SetCookie {
        SetCookie::new(&self.name, token)
            .with_secure(self.secure)
            .with_same_site(SameSitePolicy::Lax)
    }

    /// Append a `Set-Cookie` unless the request already carries the cookie.
    ///
    /// Returns the freshly issued token, if any.
    pub fn ensure(&self, request_cookies: &CookieJar, headers: &mut HeaderMap) -> Option<String> {
        if request_cookies.contains(&self.name) {
            return None;
        }
        let token = Self::generate_token();
        let value = HeaderValue::from_str(&self.set_cookie(&token).to_header_value()).ok()?;
        headers.append(SET_COOKIE, value);
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_32_hex_chars() {
        let token = CsrfCookie::generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, CsrfCookie::generate_token());
    }

    #[test]
    fn test_issued_when_absent() {
        let csrf = CsrfCookie::new("evt_csrf", true);
        let mut headers = HeaderMap::new();
        let token = csrf.ensure(&CookieJar::parse("evt_session=abc"), &mut headers).unwrap();

        let cookie = headers[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(&format!("evt_csrf={}", token)));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(!cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_never_overwritten() {
        let csrf = CsrfCookie::new("evt_csrf", true);
        let mut headers = HeaderMap::new();
        assert!(csrf.ensure(&CookieJar::parse("evt_csrf=existing"), &mut headers).is_none());
        assert!(headers.get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_keeps_other_set_cookies() {
        let csrf = CsrfCookie::new("evt_csrf", false);
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("evt_session=s; Path=/"));
        csrf.ensure(&CookieJar::default(), &mut headers);
        assert_eq!(headers.get_all(SET_COOKIE).iter().count(), 2);
    }
}
