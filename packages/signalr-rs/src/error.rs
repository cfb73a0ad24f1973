//! Error types for the SignalR Service client.

use thiserror::Error;

/// Result type for SignalR client operations.
pub type Result<T> = std::result::Result<T, SignalRError>;

/// SignalR client errors.
#[derive(Debug, Error)]
pub enum SignalRError {
    /// Token signing failed (bad key material, serialization)
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the service REST surface
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
}
