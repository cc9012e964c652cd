//! Error types for building transports

use thiserror::Error;

/// Errors raised while constructing a transport.
///
/// Failures during a probe are never surfaced here; they are reported to the
/// engine as `ProbeError`s or WebSocket outcomes.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type for transport construction
pub type Result<T> = std::result::Result<T, TransportError>;
