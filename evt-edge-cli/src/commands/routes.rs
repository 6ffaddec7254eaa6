use anyhow::Result;
use evt_edge_core::config::EdgeConfig;
use evt_edge_core::proxy::{ProxyRouteTable, ServiceRegistry};
use evt_edge_core::routing::AccessPolicy;
use std::fmt::Write;
use std::path::Path;

/// Human-readable dump of the proxy and access tables
pub fn render(config: &EdgeConfig) -> String {
    let table = ProxyRouteTable::from_config(&config.proxy);
    let registry = ServiceRegistry::from_config(&config.services);
    let policy = AccessPolicy::from_config(&config.access);

    let mut out = String::new();
    let _ = writeln!(out, "Proxy routes:");
    for route in table.routes() {
        let base = registry.base_url(route.service).unwrap_or("<unset>");
        let _ = writeln!(
            out,
            "  {:<28} -> {:<14} {}{}",
            route.base_path,
            route.service.as_str(),
            base,
            route.upstream_path
        );
    }

    let _ = writeln!(out, "Role rules:");
    for rule in &policy.role_rules {
        let roles: Vec<&str> = rule.allowed_roles.iter().map(String::as_str).collect();
        let _ = writeln!(out, "  /{{locale}}/{:<20} {}", rule.prefix, roles.join(", "));
    }

    let sessions: Vec<&str> = policy.session_prefixes.iter().map(String::as_str).collect();
    let _ = writeln!(out, "Session prefixes: {}", sessions.join(", "));
    out
}

pub fn run(path: Option<&Path>) -> Result<()> {
    let config = super::load_config(path)?;
    print!("{}", render(&config));
    Ok(())
}
