//! The edge application
//!
//! [`EdgeService`] holds the per-request pipeline; [`EdgeServer`] puts it
//! behind a hyper listener.
//!
//! # Example
//!
//! ```no_run
//! use evt_edge_core::app::EdgeServer;
//! use evt_edge_core::proxy::ServiceKind;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     EdgeServer::new()
//!         .with_port(3000)
//!         .with_service_url(ServiceKind::Events, "http://events.internal:4003")
//!         .with_frontend("http://127.0.0.1:5173")
//!         .serve()
//!         .await
//! }
//! ```

pub mod builder;
pub mod local;
pub mod server;
pub mod service;

pub use builder::EdgeServerBuilder;
pub use server::EdgeServer;
pub use service::EdgeService;
