use anyhow::Result;
use evt_edge_core::app::EdgeServer;
use std::path::Path;

pub async fn run(config: Option<&Path>, port: Option<u16>, host: Option<String>) -> Result<()> {
    let mut builder = EdgeServer::with_config(super::load_config(config)?);
    if let Some(port) = port {
        builder = builder.with_port(port);
    }
    if let Some(host) = host {
        builder = builder.with_host(host);
    }
    builder.serve().await
}
