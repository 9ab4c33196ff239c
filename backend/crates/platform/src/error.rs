//! Platform Error Types

use thiserror::Error;

/// Platform result type alias
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Errors raised by the technical infrastructure
#[derive(Debug, Error)]
pub enum PlatformError {
    /// DevTools endpoint could not be reached or answered with an error
    #[error("DevTools endpoint unreachable: {0}")]
    Unreachable(String),

    /// DevTools discovery document is malformed
    #[error("DevTools discovery failed: {0}")]
    Discovery(String),

    /// Remote browser session failed (connect, navigate, cookie read)
    #[error("Browser automation failed: {0}")]
    Browser(String),

    /// Outbound HTTP client could not be built or a request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
