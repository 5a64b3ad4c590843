//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ouhedge_exchange::ExchangeError),

    #[error("Authentication error: {0}")]
    Auth(#[from] ouhedge_exchange::AuthError),
}

pub type AppResult<T> = Result<T, AppError>;
