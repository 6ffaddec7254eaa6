//! HTTP listener around [`EdgeService`]

use crate::app::service::EdgeService;
use crate::config::EdgeConfig;
use crate::http::utils::{log_access_ip, resolve_client_ip, ClientAddr};
use crate::notify::NotificationBus;
use anyhow::{Context, Result};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoBuilder;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};

/// A configured edge ready to listen. Built by [`super::EdgeServerBuilder`].
pub struct EdgeServer {
    pub(crate) config: EdgeConfig,
    pub(crate) bus: Arc<NotificationBus>,
}

impl EdgeServer {
    /// Builder seeded from `evt-edge.toml` and the environment
    pub fn new() -> super::EdgeServerBuilder {
        super::EdgeServerBuilder::new()
    }

    /// Builder seeded from an explicit configuration
    pub fn with_config(config: EdgeConfig) -> super::EdgeServerBuilder {
        super::EdgeServerBuilder::with_config(config)
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    /// Request pipeline for this configuration
    pub fn service(&self) -> Result<EdgeService> {
        EdgeService::from_config(&self.config, self.bus.clone())
            .context("Failed to build edge service")
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        self.config.validate()?;
        // An embedding application may already own the global logger
        if let Err(e) = crate::logging::init_logging(&self.config.logging.to_logging_config()?) {
            log::debug!("Keeping existing logger: {}", e);
        }

        let addr = self.config.server.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        self.serve_with_listener(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// Connections accepted before shutdown run to completion on their own
    /// tasks.
    pub async fn serve_with_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let service = Arc::new(self.service()?);
        let access_log = self.config.server.access_log;
        let connection_timeout = self.config.server.connection_timeout_secs.map(Duration::from_secs);

        let local = listener.local_addr().context("Listener has no local address")?;
        log::info!("evt-edge listening on http://{}", local);
        log::info!("   Locales: {}", self.config.locales.supported.join(", "));
        log::info!("   Proxy routes: {}", service.proxy().routes().routes().len());
        log::info!(
            "   Frontend: {}",
            self.config.frontend.upstream_url.as_deref().unwrap_or("none")
        );
        if self.config.dev.mock_auth {
            log::warn!("Mock sign-in endpoints are enabled");
        }

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            log::warn!("Accept failed: {}", e);
                            continue;
                        }
                    };
                    tokio::spawn(serve_connection(
                        stream,
                        remote_addr,
                        service.clone(),
                        access_log,
                        connection_timeout,
                    ));
                }
            }
        }
        Ok(())
    }
}

async fn serve_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    service: Arc<EdgeService>,
    access_log: bool,
    connection_timeout: Option<Duration>,
) {
    let io = TokioIo::new(stream);
    let svc = service_fn(move |mut req: Request<Incoming>| {
        let service = service.clone();
        async move {
            let start = Instant::now();
            req.extensions_mut().insert(ClientAddr(remote_addr));
            let remote_ip = resolve_client_ip(&req, remote_addr);
            let method = req.method().to_string();
            let path = req.uri().path().to_string();

            let resp = service.handle(req).await;
            if access_log {
                log_access_ip(&remote_ip, &method, &path, &resp, start);
            }
            Ok::<_, Infallible>(resp)
        }
    });

    let mut builder = AutoBuilder::new(TokioExecutor::new());
    builder.http1().keep_alive(true).max_buf_size(64 * 1024);
    let conn = builder.serve_connection(io, svc);

    match connection_timeout {
        Some(limit) => match tokio::time::timeout(limit, conn).await {
            Ok(Err(err)) => log::debug!("Connection error from {}: {}", remote_addr, err),
            Err(_) => log::debug!("Connection from {} timed out after {:?}", remote_addr, limit),
            Ok(Ok(())) => {}
        },
        None => {
            if let Err(err) = conn.await {
                log::debug!("Connection error from {}: {}", remote_addr, err);
            }
        }
    }
}
