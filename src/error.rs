//! Error types for linkframe.
//!
//! Nothing on the tick path returns an error: framing misses, overflow,
//! incomplete frames and check mismatches are reported through flags,
//! counters and `tracing` events. Errors only arise while building a
//! pipeline from configuration.

use thiserror::Error;

/// Main error type for all linkframe operations.
#[derive(Debug, Error)]
pub enum LinkFrameError {
    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (configuration files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias using LinkFrameError.
pub type Result<T> = std::result::Result<T, LinkFrameError>;
