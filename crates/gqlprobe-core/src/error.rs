//! Error types for gqlprobe-core.

use thiserror::Error;

/// Errors surfaced by the engine's own API.
///
/// Probe failures are never reported through this type; they become
/// diagnoses inside a [`crate::Report`].
#[derive(Error, Debug)]
pub enum DoctorError {
    /// Endpoint string could not be used
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Configuration value out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON rendering error
    #[error("JSON rendering error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, DoctorError>;
