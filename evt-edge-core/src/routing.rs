//! Route classification
//!
//! Decides, from the path alone, which policy applies to a request:
//! excluded from policy, role-gated, session-gated, or unrestricted.

use crate::config::AccessConfig;
use std::collections::BTreeSet;

/// Prefix that only callers with one of `allowed_roles` may visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRouteRule {
    pub prefix: String,
    pub allowed_roles: BTreeSet<String>,
}

impl RoleRouteRule {
    pub fn new(prefix: &str, roles: &[&str]) -> Self {
        Self {
            prefix: prefix.to_string(),
            allowed_roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn allows(&self, role: &str) -> bool {
        self.allowed_roles.contains(role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteClass {
    /// Static assets, framework internals and `/api`
    Excluded,
    RoleGated {
        allowed: BTreeSet<String>,
        /// The prefix is also session-gated
        session_required: bool,
    },
    SessionGated,
    Unrestricted,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Excluded => "excluded",
            RouteClass::RoleGated { .. } => "role_gated",
            RouteClass::SessionGated => "session_gated",
            RouteClass::Unrestricted => "unrestricted",
        }
    }
}

/// Static access tables, loaded once at startup
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub excluded_prefixes: Vec<String>,
    pub role_rules: Vec<RoleRouteRule>,
    pub session_prefixes: BTreeSet<String>,
}

impl AccessPolicy {
    pub fn from_config(config: &AccessConfig) -> Self {
        Self {
            excluded_prefixes: config.excluded_prefixes.clone(),
            role_rules: config
                .role_routes
                .iter()
                .map(|r| RoleRouteRule {
                    prefix: r.prefix.clone(),
                    allowed_roles: r.roles.iter().cloned().collect(),
                })
                .collect(),
            session_prefixes: config.session_prefixes.iter().cloned().collect(),
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::from_config(&AccessConfig::default())
    }
}

/// True when `path` equals `prefix` or continues it with a `/`
pub(crate) fn matches_segment_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[derive(Debug, Clone)]
pub struct RouteClassifier {
    policy: AccessPolicy,
}

impl RouteClassifier {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Paths that skip locale handling and access policy.
    ///
    /// A path whose last segment contains a dot is treated as a file, unless
    /// its first segment is role- or session-gated.
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.is_excluded_prefix(path) {
            return true;
        }
        looks_like_file(path) && !self.is_gated(path)
    }

    fn is_excluded_prefix(&self, path: &str) -> bool {
        self.policy.excluded_prefixes.iter().any(|p| matches_segment_prefix(path, p))
    }

    /// True when the first segment of `effective_path` carries a role or
    /// session rule
    pub fn is_gated(&self, effective_path: &str) -> bool {
        let prefix = gate_prefix(effective_path);
        !prefix.is_empty()
            && (self.policy.session_prefixes.contains(prefix)
                || self.policy.role_rules.iter().any(|r| r.prefix == prefix))
    }

    /// Classify a path below the locale, e.g. `/admin/events`
    pub fn classify(&self, effective_path: &str) -> RouteClass {
        if self.is_excluded_prefix(effective_path) {
            return RouteClass::Excluded;
        }

        let prefix = gate_prefix(effective_path);
        let session_gated = !prefix.is_empty() && self.policy.session_prefixes.contains(prefix);

        if let Some(rule) = self.policy.role_rules.iter().find(|r| r.prefix == prefix) {
            return RouteClass::RoleGated {
                allowed: rule.allowed_roles.clone(),
                session_required: session_gated,
            };
        }

        if session_gated {
            RouteClass::SessionGated
        } else if looks_like_file(effective_path) {
            RouteClass::Excluded
        } else {
            RouteClass::Unrestricted
        }
    }
}

/// First path segment without any extension: `/admin/x` and `/admin.csv`
/// both give `admin`
fn gate_prefix(path: &str) -> &str {
    let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
    first.split('.').next().unwrap_or("")
}

fn looks_like_file(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RouteClassifier {
        RouteClassifier::new(AccessPolicy::default())
    }

    #[test]
    fn test_excluded_paths() {
        let c = classifier();
        assert!(c.is_excluded("/api"));
        assert!(c.is_excluded("/api/events/42"));
        assert!(c.is_excluded("/_next/static/chunk.js"));
        assert!(c.is_excluded("/favicon.ico"));
        assert!(c.is_excluded("/robots.txt"));
        assert!(c.is_excluded("/ro/images/logo.png"));
        assert!(!c.is_excluded("/apiary"));
        assert!(!c.is_excluded("/ro/dashboard"));
    }

    #[test]
    fn test_role_gated_admin() {
        match classifier().classify("/admin/events") {
            RouteClass::RoleGated { allowed, session_required } => {
                assert!(allowed.contains("admin"));
                assert!(!allowed.contains("provider"));
                assert!(session_required);
            }
            other => panic!("unexpected class {:?}", other),
        }
    }

    #[test]
    fn test_provider_allows_admin() {
        match classifier().classify("/provider") {
            RouteClass::RoleGated { allowed, .. } => {
                assert!(allowed.contains("provider"));
                assert!(allowed.contains("admin"));
            }
            other => panic!("unexpected class {:?}", other),
        }
    }

    #[test]
    fn test_exact_segment_match_only() {
        let c = classifier();
        assert_eq!(c.classify("/administrator"), RouteClass::Unrestricted);
        assert_eq!(c.classify("/providers"), RouteClass::Unrestricted);
    }

    #[test]
    fn test_session_gated_and_unrestricted() {
        let c = classifier();
        assert_eq!(c.classify("/dashboard"), RouteClass::SessionGated);
        assert_eq!(c.classify("/events/7"), RouteClass::SessionGated);
        assert_eq!(c.classify("/"), RouteClass::Unrestricted);
        assert_eq!(c.classify("/login"), RouteClass::Unrestricted);
    }

    #[test]
    fn test_first_rule_wins() {
        let policy = AccessPolicy {
            excluded_prefixes: vec![],
            role_rules: vec![
                RoleRouteRule::new("admin", &["admin"]),
                RoleRouteRule::new("admin", &["client"]),
            ],
            session_prefixes: BTreeSet::new(),
        };
        match RouteClassifier::new(policy).classify("/admin") {
            RouteClass::RoleGated { allowed, session_required } => {
                assert!(!allowed.contains("client"));
                assert!(!session_required);
            }
            other => panic!("unexpected class {:?}", other),
        }
    }

    #[test]
    fn test_dotted_gated_paths_stay_gated() {
        let c = classifier();
        assert!(!c.is_excluded("/admin/users.csv"));
        assert!(!c.is_excluded("/dashboard.json"));
        assert!(matches!(c.classify("/admin/users.csv"), RouteClass::RoleGated { .. }));
        assert!(matches!(c.classify("/admin/v1.2"), RouteClass::RoleGated { .. }));
        assert_eq!(c.classify("/dashboard.json"), RouteClass::SessionGated);
        assert_eq!(c.classify("/images/logo.png"), RouteClass::Excluded);
        assert_eq!(c.classify("/_next/static/chunk.js"), RouteClass::Excluded);
    }

    #[test]
    fn test_segment_prefix_helper() {
        assert!(matches_segment_prefix("/api/events", "/api/events"));
        assert!(matches_segment_prefix("/api/events/42", "/api/events/"));
        assert!(!matches_segment_prefix("/api/eventsx", "/api/events"));
    }
}
