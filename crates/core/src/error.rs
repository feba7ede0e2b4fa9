//! Error types for the enamAI domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Provider failures have their own enum because the chat flow recovers
//! from them locally instead of propagating them.

use thiserror::Error;

/// The top-level error type for enamAI operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request validation ---
    #[error("Invalid request: {0}")]
    Validation(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- I/O (listener bind, stdin) ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the remote prediction call.
///
/// The chat service never surfaces these to callers; it logs them and
/// answers from the fallback rules.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 503,
            message: "Service Unavailable".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn validation_error_displays_reason() {
        let err = Error::Validation("message must not be empty".into());
        assert_eq!(err.to_string(), "Invalid request: message must not be empty");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }
}
