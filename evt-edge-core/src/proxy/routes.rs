//! UI-facing `/api/...` prefixes and the internal paths they map to

use crate::config::ProxyConfig;
use crate::proxy::ServiceKind;
use crate::routing::matches_segment_prefix;
use serde::Serialize;

/// One proxy route: `base_path` on the edge becomes `upstream_path` on `service`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyTarget {
    pub base_path: String,
    pub service: ServiceKind,
    pub upstream_path: String,
}

impl ProxyTarget {
    pub fn new(base_path: &str, service: ServiceKind, upstream_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
            service,
            upstream_path: upstream_path.trim_end_matches('/').to_string(),
        }
    }
}

/// A resolved route plus the path remainder after its `base_path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub target: &'a ProxyTarget,
    /// Empty or starting with `/`
    pub rest: &'a str,
}

impl RouteMatch<'_> {
    /// Internal path: `upstream_path` followed by the remainder
    pub fn upstream_path(&self) -> String {
        let path = format!("{}{}", self.target.upstream_path, self.rest);
        if path.is_empty() {
            "/".to_string()
        } else {
            path
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyRouteTable {
    routes: Vec<ProxyTarget>,
}

impl ProxyRouteTable {
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    /// Built-in routes for the six services
    pub fn with_defaults() -> Self {
        use ServiceKind::*;

        let mut table = Self::empty();
        for (base, service, upstream) in [
            ("/api/auth", Auth, "/auth"),
            ("/api/users", Users, "/users"),
            ("/api/me", Users, "/users/me"),
            ("/api/events", Events, "/events"),
            ("/api/budgets", Events, "/budgets"),
            ("/api/bookings", Events, "/bookings"),
            ("/api/providers", Providers, "/providers"),
            ("/api/reviews", Providers, "/reviews"),
            ("/api/categories", Providers, "/categories"),
            ("/api/notifications", Notifications, "/notifications"),
            ("/api/modules", Modules, "/modules"),
            ("/api/admin/users", Users, "/admin/users"),
            ("/api/admin/events", Events, "/admin/events"),
            ("/api/admin/providers", Providers, "/admin/providers"),
            ("/api/admin/modules", Modules, "/admin/modules"),
        ] {
            table.add(ProxyTarget::new(base, service, upstream));
        }
        table
    }

    /// Built-in routes followed by the configured ones
    pub fn from_config(config: &ProxyConfig) -> Self {
        let mut table = Self::with_defaults();
        for route in &config.routes {
            table.add(ProxyTarget::new(&route.base_path, route.service, &route.upstream_path));
        }
        table
    }

    /// Add a route; a route with the same `base_path` is replaced
    pub fn add(&mut self, target: ProxyTarget) {
        match self.routes.iter_mut().find(|r| r.base_path == target.base_path) {
            Some(existing) => *existing = target,
            None => self.routes.push(target),
        }
    }

    pub fn routes(&self) -> &[ProxyTarget] {
        &self.routes
    }

    /// Longest matching `base_path` wins; matching stops at segment boundaries
    pub fn resolve<'a>(&'a self, path: &'a str) -> Option<RouteMatch<'a>> {
        self.routes
            .iter()
            .filter(|r| matches_segment_prefix(path, &r.base_path))
            .max_by_key(|r| r.base_path.len())
            .map(|target| RouteMatch { target, rest: &path[target.base_path.len()..] })
    }
}

impl Default for ProxyRouteTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyRouteConfig;

    #[test]
    fn test_resolve_events() {
        let table = ProxyRouteTable::with_defaults();
        let m = table.resolve("/api/events/42").unwrap();
        assert_eq!(m.target.service, ServiceKind::Events);
        assert_eq!(m.rest, "/42");
        assert_eq!(m.upstream_path(), "/events/42");
    }

    #[test]
    fn test_segment_boundary() {
        let table = ProxyRouteTable::with_defaults();
        assert!(table.resolve("/api/eventsx").is_none());
        assert_eq!(table.resolve("/api/events").unwrap().upstream_path(), "/events");
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = ProxyRouteTable::with_defaults();
        let m = table.resolve("/api/admin/providers/9/approve").unwrap();
        assert_eq!(m.target.service, ServiceKind::Providers);
        assert_eq!(m.upstream_path(), "/admin/providers/9/approve");
    }

    #[test]
    fn test_alias_route() {
        let table = ProxyRouteTable::with_defaults();
        assert_eq!(table.resolve("/api/me").unwrap().upstream_path(), "/users/me");
    }

    #[test]
    fn test_config_routes_extend_and_replace() {
        let config = ProxyConfig {
            routes: vec![
                ProxyRouteConfig {
                    base_path: "/api/venues".to_string(),
                    service: ServiceKind::Events,
                    upstream_path: "/venues".to_string(),
                },
                ProxyRouteConfig {
                    base_path: "/api/me".to_string(),
                    service: ServiceKind::Auth,
                    upstream_path: "/auth/me".to_string(),
                },
            ],
            ..Default::default()
        };
        let table = ProxyRouteTable::from_config(&config);
        assert_eq!(table.resolve("/api/venues/3").unwrap().upstream_path(), "/venues/3");
        let me = table.resolve("/api/me").unwrap();
        assert_eq!(me.target.service, ServiceKind::Auth);
        assert_eq!(table.routes().len(), ProxyRouteTable::with_defaults().routes().len() + 1);
    }
}
