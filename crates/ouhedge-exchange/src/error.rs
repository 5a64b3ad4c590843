//! Error types for ouhedge-exchange.

use thiserror::Error;

/// Session/login failures. An iteration aborts cleanly on these and retries
/// with a forced re-auth on the next tick.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login request failed: {0}")]
    Request(String),

    #[error("Login rejected by exchange: {0}")]
    Rejected(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// Exchange call failures.
///
/// For read calls these mean "no data this tick"; for order actions the
/// caller must not assume any state changed.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("HTTP transport failure: {0}")]
    Http(String),

    #[error("Malformed exchange response: {0}")]
    MalformedResponse(String),

    #[error("Exchange rejected the request: {0}")]
    Rejected(String),
}

/// Result type alias for exchange operations.
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
