//! Builder pattern for EdgeServer

use super::EdgeServer;
use crate::config::{EdgeConfig, ProxyRouteConfig, RoleRouteConfig};
use crate::notify::NotificationBus;
use crate::proxy::ServiceKind;
use anyhow::Result;
use std::sync::Arc;

/// Builder for EdgeServer
pub struct EdgeServerBuilder {
    config: EdgeConfig,
    bus: Option<Arc<NotificationBus>>,
}

impl EdgeServerBuilder {
    /// Create a new builder from `evt-edge.toml` and the environment,
    /// falling back to defaults
    pub fn new() -> Self {
        Self { config: EdgeConfig::load().unwrap_or_default(), bus: None }
    }

    /// Create a builder with custom configuration
    pub fn with_config(config: EdgeConfig) -> Self {
        Self { config, bus: None }
    }

    // ========================================================================
    // SERVER
    // ========================================================================

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Upper bound on a connection's lifetime, in seconds
    pub fn with_connection_timeout(mut self, secs: u64) -> Self {
        self.config.server.connection_timeout_secs = Some(secs);
        self
    }

    pub fn with_access_log(mut self, enabled: bool) -> Self {
        self.config.server.access_log = enabled;
        self
    }

    /// Cap on request bodies the edge buffers itself
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.config.server.max_body_size = bytes;
        self
    }

    // ========================================================================
    // LOCALES AND ACCESS
    // ========================================================================

    pub fn with_locales(mut self, supported: &[&str], default: &str) -> Self {
        self.config.locales.supported = supported.iter().map(|s| s.to_string()).collect();
        self.config.locales.default = default.to_string();
        self
    }

    /// Append a role rule; earlier rules win on the same prefix
    pub fn with_role_route(mut self, prefix: &str, roles: &[&str]) -> Self {
        self.config.access.role_routes.push(RoleRouteConfig::new(prefix, roles));
        self
    }

    pub fn with_session_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.access.session_prefixes.push(prefix.into());
        self
    }

    /// Accept only role cookies signed with this secret
    pub fn with_role_cookie_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.identity.role_cookie_secret = Some(secret.into());
        self
    }

    // ========================================================================
    // UPSTREAMS
    // ========================================================================

    /// Point a service at a base URL
    pub fn with_service_url(mut self, kind: ServiceKind, url: impl Into<String>) -> Self {
        self.config.services.set(kind, Some(url.into()));
        self
    }

    /// Remove a service's base URL; its routes answer 500
    pub fn without_service(mut self, kind: ServiceKind) -> Self {
        self.config.services.set(kind, None);
        self
    }

    pub fn with_proxy_route(
        mut self,
        base_path: impl Into<String>,
        service: ServiceKind,
        upstream_path: impl Into<String>,
    ) -> Self {
        self.config.proxy.routes.push(ProxyRouteConfig {
            base_path: base_path.into(),
            service,
            upstream_path: upstream_path.into(),
        });
        self
    }

    pub fn with_proxy_timeout(mut self, secs: u64) -> Self {
        self.config.proxy.timeout_secs = secs;
        self
    }

    /// Include transport error details in 502 bodies
    pub fn with_expose_diagnostics(mut self, expose: bool) -> Self {
        self.config.proxy.expose_diagnostics = expose;
        self
    }

    /// Front end that renders allowed page requests
    pub fn with_frontend(mut self, url: impl Into<String>) -> Self {
        self.config.frontend.upstream_url = Some(url.into());
        self
    }

    // ========================================================================
    // NOTIFICATIONS
    // ========================================================================

    /// Share a bus with other components; defaults to the process-wide bus
    pub fn with_bus(mut self, bus: Arc<NotificationBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn with_heartbeat_secs(mut self, secs: u64) -> Self {
        self.config.notifications.heartbeat_secs = secs;
        self
    }

    pub fn with_publish_key(mut self, key: impl Into<String>) -> Self {
        self.config.notifications.publish_key = Some(key.into());
        self
    }

    // ========================================================================
    // DEVELOPMENT AND LOGGING
    // ========================================================================

    pub fn with_mock_auth(mut self, enabled: bool) -> Self {
        self.config.dev.mock_auth = enabled;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_log_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Validate and build the server
    pub fn build(self) -> Result<EdgeServer> {
        self.config.validate()?;
        Ok(EdgeServer { config: self.config, bus: self.bus.unwrap_or_else(NotificationBus::global) })
    }

    /// Build and serve until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let server = self.build()?;
        server.serve().await
    }
}

impl Default for EdgeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_config() {
        let server = EdgeServerBuilder::with_config(EdgeConfig::default())
            .with_port(8081)
            .with_service_url(ServiceKind::Events, "http://internal:4003/")
            .with_frontend("http://127.0.0.1:5173")
            .with_mock_auth(true)
            .build()
            .unwrap();

        assert_eq!(server.config().server.port, 8081);
        assert_eq!(server.config().services.get(ServiceKind::Events), Some("http://internal:4003/"));
        assert!(server.config().dev.mock_auth);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = EdgeServerBuilder::with_config(EdgeConfig::default())
            .with_locales(&["en"], "fr")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_shared_bus() {
        let bus = Arc::new(NotificationBus::new());
        let server = EdgeServerBuilder::with_config(EdgeConfig::default())
            .with_bus(bus.clone())
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(server.bus(), &bus));
    }
}
