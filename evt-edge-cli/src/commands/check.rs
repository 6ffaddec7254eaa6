use anyhow::{Context, Result};
use evt_edge_core::app::EdgeService;
use evt_edge_core::config::EdgeConfig;
use evt_edge_core::notify::NotificationBus;
use std::path::Path;
use std::sync::Arc;

/// Validate every section and build the pipeline once, so header values
/// and the HTTP client are checked too
pub fn check(config: &EdgeConfig) -> Result<()> {
    config.validate()?;
    EdgeService::from_config(config, Arc::new(NotificationBus::new()))
        .context("Failed to build edge service")?;
    Ok(())
}

pub fn run(path: Option<&Path>) -> Result<()> {
    let config = super::load_config(path)?;
    check(&config)?;
    println!("Configuration OK");
    println!("  listen:   {}", config.server.bind_address());
    println!("  locales:  {} (default {})", config.locales.supported.join(", "), config.locales.default);
    println!("  frontend: {}", config.frontend.upstream_url.as_deref().unwrap_or("none"));
    if config.dev.mock_auth {
        println!("  warning:  mock sign-in endpoints are enabled");
    }
    Ok(())
}
