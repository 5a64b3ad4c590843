//! Error types for ouhedge-core.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Odds outside the valid (1.0, 1000.0] range: {0}")]
    OddsOutOfRange(Decimal),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
