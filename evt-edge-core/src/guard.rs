//! Role and session enforcement for page routes
//!
//! [`decide`] is a pure function of the request context: it never performs
//! I/O and never fails. Gating outcomes are redirects, not errors.

use crate::config::{AccessConfig, IdentityConfig};
use crate::error::{EdgeError, Result};
use crate::http::CookieJar;
use crate::routing::RouteClass;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Who is calling, as far as the edge can tell.
///
/// Request-scoped and immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub role: String,
    pub session: Option<String>,
}

impl Identity {
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }
}

/// Resolves the caller identity from request cookies
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, cookies: &CookieJar) -> Identity;
}

/// Reads the role from a plaintext cookie
#[derive(Debug, Clone)]
pub struct CookieIdentityResolver {
    role_cookie: String,
    session_cookie: String,
    default_role: String,
}

impl CookieIdentityResolver {
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self {
            role_cookie: config.role_cookie.clone(),
            session_cookie: config.session_cookie.clone(),
            default_role: config.default_role.clone(),
        }
    }

    fn session(&self, cookies: &CookieJar) -> Option<String> {
        cookies.get_non_empty(&self.session_cookie).map(str::to_string)
    }
}

impl IdentityResolver for CookieIdentityResolver {
    fn resolve(&self, cookies: &CookieJar) -> Identity {
        let role = cookies
            .get_non_empty(&self.role_cookie)
            .map(str::to_string)
            .unwrap_or_else(|| self.default_role.clone());
        Identity { role, session: self.session(cookies) }
    }
}

/// Reads the role from a cookie of the form `<role>.<hex hmac-sha256>`.
///
/// Unsigned, malformed or forged values resolve to the default role.
#[derive(Clone)]
pub struct SignedCookieIdentityResolver {
    cookies: CookieIdentityResolver,
    secret: Vec<u8>,
}

impl std::fmt::Debug for SignedCookieIdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedCookieIdentityResolver")
            .field("cookies", &self.cookies)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SignedCookieIdentityResolver {
    pub fn new(config: &IdentityConfig, secret: impl Into<Vec<u8>>) -> Self {
        Self { cookies: CookieIdentityResolver::from_config(config), secret: secret.into() }
    }

    fn verified_role<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (role, signature) = value.rsplit_once('.')?;
        if role.is_empty() {
            return None;
        }
        let signature = hex::decode(signature).ok()?;
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(role.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(role)
    }
}

impl IdentityResolver for SignedCookieIdentityResolver {
    fn resolve(&self, cookies: &CookieJar) -> Identity {
        let role = cookies
            .get_non_empty(&self.cookies.role_cookie)
            .and_then(|value| self.verified_role(value))
            .map(str::to_string)
            .unwrap_or_else(|| self.cookies.default_role.clone());
        Identity { role, session: self.cookies.session(cookies) }
    }
}

/// Produce the signed cookie value for `role`
pub fn sign_role(secret: &[u8], role: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| EdgeError::Config(format!("role cookie secret: {}", e)))?;
    mac.update(role.as_bytes());
    Ok(format!("{}.{}", role, hex::encode(mac.finalize().into_bytes())))
}

/// Signed resolver when a role cookie secret is configured, plaintext otherwise
pub fn build_identity_resolver(config: &IdentityConfig) -> Arc<dyn IdentityResolver> {
    match config.role_cookie_secret.as_deref() {
        Some(secret) if !secret.is_empty() => {
            Arc::new(SignedCookieIdentityResolver::new(config, secret.as_bytes()))
        }
        _ => Arc::new(CookieIdentityResolver::from_config(config)),
    }
}

/// Everything the enforcer knows about one page request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Original request path, locale included
    pub path: String,
    pub query: Option<String>,
    pub locale: String,
    pub class: RouteClass,
    pub role: String,
    pub has_session: bool,
    pub cookies: CookieJar,
}

impl RequestContext {
    /// Path and query as the client sent them
    pub fn path_and_query(&self) -> String {
        match self.query.as_deref().filter(|q| !q.is_empty()) {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
}

/// Locale-relative redirect targets
#[derive(Debug, Clone)]
pub struct RedirectTargets {
    pub dashboard_path: String,
    pub login_path: String,
}

impl RedirectTargets {
    pub fn from_config(config: &AccessConfig) -> Self {
        Self { dashboard_path: config.dashboard_path.clone(), login_path: config.login_path.clone() }
    }

    pub fn dashboard(&self, locale: &str) -> String {
        format!("/{}{}", locale, self.dashboard_path)
    }

    pub fn login(&self, locale: &str, next: &str) -> String {
        format!("/{}{}?next={}", locale, self.login_path, urlencoding::encode(next))
    }
}

impl Default for RedirectTargets {
    fn default() -> Self {
        Self::from_config(&AccessConfig::default())
    }
}

pub fn decide(ctx: &RequestContext, targets: &RedirectTargets) -> Decision {
    let session_required = match &ctx.class {
        RouteClass::RoleGated { allowed, session_required } => {
            if !allowed.contains(&ctx.role) {
                return Decision::Redirect(targets.dashboard(&ctx.locale));
            }
            *session_required
        }
        RouteClass::SessionGated => true,
        RouteClass::Excluded | RouteClass::Unrestricted => false,
    };

    if session_required && !ctx.has_session {
        return Decision::Redirect(targets.login(&ctx.locale, &ctx.path_and_query()));
    }

    Decision::Allow
}
