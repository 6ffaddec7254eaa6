//! Crate-level error type

/// Errors raised while building or running the edge.
///
/// Request-path failures never surface as `EdgeError`: they are turned into
/// JSON envelopes by [`crate::proxy::ProxyError`] and
/// [`crate::notify::PublishError`].
#[derive(thiserror::Error, Debug)]
pub enum EdgeError {
    /// A configuration value is unusable
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A configured header value cannot be sent on the wire
    #[error("invalid value for header {name}: {value:?}")]
    InvalidHeader { name: String, value: String },

    /// The upstream HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Socket and file errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, EdgeError>;
