//! Fixed security response headers

use crate::config::SecurityConfig;
use crate::error::{EdgeError, Result};
use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, REFERRER_POLICY,
    STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Assemble the `Content-Security-Policy` value from the configured allow-lists
pub fn build_csp(config: &SecurityConfig) -> String {
    let directives: [(&str, &[String]); 5] = [
        ("script-src", &config.script_src),
        ("style-src", &config.style_src),
        ("img-src", &config.img_src),
        ("font-src", &config.font_src),
        ("connect-src", &config.connect_src),
    ];

    let mut parts = vec!["default-src 'self'".to_string()];
    for (name, sources) in directives {
        parts.push(format!("{} {}", name, sources.join(" ")));
    }
    parts.push("frame-ancestors 'none'".to_string());
    parts.push("base-uri 'self'".to_string());
    parts.push("form-action 'self'".to_string());
    parts.join("; ")
}

/// Pre-validated header set, built once at startup and copied onto every response
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| EdgeError::InvalidHeader {
        name: name.as_str().to_string(),
        value: value.to_string(),
    })
}

impl SecurityHeaders {
    pub fn from_config(config: &SecurityConfig) -> Result<Self> {
        let headers = vec![
            (X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
            (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            (REFERRER_POLICY, HeaderValue::from_static("strict-origin-when-cross-origin")),
            (
                STRICT_TRANSPORT_SECURITY,
                header_value(&STRICT_TRANSPORT_SECURITY, &config.strict_transport_security)?,
            ),
            (PERMISSIONS_POLICY, header_value(&PERMISSIONS_POLICY, &config.permissions_policy)?),
            (CONTENT_SECURITY_POLICY, header_value(&CONTENT_SECURITY_POLICY, &build_csp(config))?),
        ];
        Ok(Self { headers })
    }

    /// Set every header, replacing values an upstream may have sent
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }
}
