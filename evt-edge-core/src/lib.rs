//! evt-edge - Core
//!
//! The request edge of the event-planning platform. Every browser request
//! passes through it before reaching a page or an internal service.
//!
//! # Overview
//!
//! - Page requests are forced onto a locale prefix (`/ro/...`, `/en/...`),
//!   classified against role and session rules, and either redirected or
//!   relayed to the front end.
//! - `/api/...` requests are forwarded to the owning microservice by the
//!   BFF proxy, with the caller's token turned into a bearer header.
//! - Notifications published internally fan out to browsers over
//!   Server-Sent Events.
//! - Every response leaves with the same security headers and a CSRF cookie.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use evt_edge_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     EdgeServer::new()
//!         .with_port(3000)
//!         .with_service_url(ServiceKind::Events, "http://events.internal:4003")
//!         .serve()
//!         .await
//! }
//! ```
//!
//! # Architecture
//!
//! - [`locale`] - locale prefix resolution
//! - [`routing`] - route classification
//! - [`guard`] - role and session enforcement
//! - [`security`] - security headers and CSRF cookie
//! - [`proxy`] - BFF proxy to internal services
//! - [`notify`] - notification bus and SSE stream
//! - [`app`] - request pipeline and HTTP server

pub mod app;
pub mod config; // Configuration system with TOML support
pub mod error;
pub mod guard;
pub mod http;
pub mod locale;
pub mod logging; // Structured logging on the standard log crate
pub mod notify;
pub mod proxy;
pub mod routing;
pub mod security;

// Prelude module for convenient imports
pub mod prelude;

pub use app::{EdgeServer, EdgeServerBuilder, EdgeService};
pub use config::EdgeConfig;
pub use error::{EdgeError, Result};
