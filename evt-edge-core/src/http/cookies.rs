//! Cookie parsing and `Set-Cookie` building

use hyper::header::{HeaderMap, COOKIE};
use serde::{Deserialize, Serialize};

/// SameSite policy for emitted cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSitePolicy {
    Strict,
    Lax,
    None,
}

impl SameSitePolicy {
    fn as_str(&self) -> &'static str {
        match self {
            SameSitePolicy::Strict => "Strict",
            SameSitePolicy::Lax => "Lax",
            SameSitePolicy::None => "None",
        }
    }
}

/// Request cookies, in the order the client sent them.
///
/// When a name appears twice the first occurrence wins, like browsers
/// ordering the more specific path first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    /// Collect cookies from every `Cookie` header of a request
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut jar = Self::default();
        for value in headers.get_all(COOKIE) {
            if let Ok(raw) = value.to_str() {
                jar.extend_from_header(raw);
            }
        }
        jar
    }

    /// Parse a single `Cookie` header value
    pub fn parse(header: &str) -> Self {
        let mut jar = Self::default();
        jar.extend_from_header(header);
        jar
    }

    fn extend_from_header(&mut self, header: &str) {
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim().trim_matches('"');
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            self.cookies.push((name.to_string(), value));
        }
    }

    /// Value of the named cookie
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Value of the named cookie, ignoring empty values
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Builder for a `Set-Cookie` header value
#[derive(Debug, Clone)]
pub struct SetCookie {
    name: String,
    value: String,
    path: String,
    max_age: Option<i64>,
    secure: bool,
    http_only: bool,
    same_site: SameSitePolicy,
}

impl SetCookie {
    /// Cookie scoped to `/`, `Secure`, `SameSite=Lax`, readable by scripts
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            max_age: None,
            secure: true,
            http_only: false,
            same_site: SameSitePolicy::Lax,
        }
    }

    /// A cookie that tells the browser to drop `name` immediately
    pub fn expired(name: impl Into<String>) -> Self {
        Self::new(name, "").with_max_age(0)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSitePolicy) -> Self {
        self.same_site = same_site;
        self
    }

    /// Render the header value
    pub fn to_header_value(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];
        parts.push(format!("Path={}", self.path));
        if let Some(max_age) = self.max_age {
            parts.push(format!("Max-Age={}", max_age));
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.push(format!("SameSite={}", self.same_site.as_str()));
        parts.join("; ")
    }
}
