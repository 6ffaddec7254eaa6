//! Response decoration: security headers and the CSRF cookie
//!
//! Every response leaving the edge goes through [`ResponseDecorator::decorate`]
//! exactly once, whatever branch produced it.

pub mod csrf;
pub mod headers;

pub use csrf::CsrfCookie;
pub use headers::{build_csp, SecurityHeaders};

use crate::config::{IdentityConfig, SecurityConfig};
use crate::error::Result;
use crate::http::CookieJar;
use hyper::Response;

#[derive(Debug, Clone)]
pub struct ResponseDecorator {
    headers: SecurityHeaders,
    csrf: CsrfCookie,
}

impl ResponseDecorator {
    pub fn new(headers: SecurityHeaders, csrf: CsrfCookie) -> Self {
        Self { headers, csrf }
    }

    pub fn from_config(security: &SecurityConfig, identity: &IdentityConfig) -> Result<Self> {
        Ok(Self::new(
            SecurityHeaders::from_config(security)?,
            CsrfCookie::new(identity.csrf_cookie.clone(), security.csrf_cookie_secure),
        ))
    }

    pub fn decorate<B>(&self, mut resp: Response<B>, request_cookies: &CookieJar) -> Response<B> {
        self.headers.apply(resp.headers_mut());
        self.csrf.ensure(request_cookies, resp.headers_mut());
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{SET_COOKIE, X_FRAME_OPTIONS};

    fn decorator() -> ResponseDecorator {
        ResponseDecorator::from_config(&SecurityConfig::default(), &IdentityConfig::default())
            .unwrap()
    }

    #[test]
    fn test_decorate_adds_headers_and_csrf() {
        let resp = decorator().decorate(Response::new(()), &CookieJar::default());
        assert_eq!(resp.headers()[X_FRAME_OPTIONS], "DENY");
        assert!(resp.headers()[SET_COOKIE].to_str().unwrap().starts_with("evt_csrf="));
    }

    #[test]
    fn test_decorate_is_idempotent_for_csrf() {
        let jar = CookieJar::parse("evt_csrf=abc");
        let resp = decorator().decorate(Response::new(()), &jar);
        assert!(resp.headers().get(SET_COOKIE).is_none());
    }
}
