//! BFF proxy for the `/api` namespace
//!
//! The browser talks to the edge only. Each UI-facing `/api/...` prefix maps
//! to a path on one internal service; the dispatcher forwards the call with
//! a bearer token derived from the request and relays the answer.
//!
//! - [`service`] - service kinds and configured base URLs
//! - [`routes`] - the `/api` route table
//! - [`token`] - bearer token derivation
//! - [`headers`] - hop-by-hop and cookie scrubbing
//! - [`dispatcher`] - the forwarding itself
//! - [`error`] - failures and their JSON envelopes

pub mod dispatcher;
pub mod error;
pub mod headers;
pub mod routes;
pub mod service;
pub mod token;

pub use dispatcher::{build_client, ProxyDispatcher};
pub use error::ProxyError;
pub use headers::{is_hop_by_hop, HOP_BY_HOP};
pub use routes::{ProxyRouteTable, ProxyTarget, RouteMatch};
pub use service::{ServiceKind, ServiceRegistry};
pub use token::derive_bearer;
