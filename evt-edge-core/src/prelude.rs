//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use evt_edge_core::prelude::*;
//! ```

// === Server ===
pub use crate::app::{EdgeServer, EdgeServerBuilder, EdgeService};

// === Configuration ===
pub use crate::config::EdgeConfig;
pub use crate::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};

// === Access policy ===
pub use crate::guard::{decide, Decision, Identity, IdentityResolver, RequestContext};
pub use crate::locale::{LocaleResolution, LocaleResolver};
pub use crate::routing::{AccessPolicy, RouteClass, RouteClassifier};

// === Proxy and notifications ===
pub use crate::notify::{Notification, NotificationBus, PublishRequest, SubscriberFilter};
pub use crate::proxy::{ProxyDispatcher, ProxyError, ServiceKind};

// === HTTP essentials (re-exported from the `http` crate) ===
pub use http::Method;
pub use http::Request;
pub use http::Response;
pub use http::StatusCode;

// === Errors ===
pub use crate::error::{EdgeError, Result};
