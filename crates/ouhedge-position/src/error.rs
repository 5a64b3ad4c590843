//! Error types for ouhedge-position.

use thiserror::Error;

/// Position management failures.
#[derive(Debug, Error)]
pub enum PositionError {
    #[error(transparent)]
    Exchange(#[from] ouhedge_exchange::ExchangeError),

    #[error("Derived hedge price invalid: {0}")]
    Price(#[from] ouhedge_core::CoreError),
}

/// Result type alias for position operations.
pub type Result<T> = std::result::Result<T, PositionError>;
