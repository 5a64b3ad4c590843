//! Over/under hedging daemon.
//!
//! Orchestrates the full trading cycle on a fixed tick:
//! - session token upkeep
//! - advancement of existing positions (stop-loss, hedge, close)
//! - discovery and screening of new events and markets
//! - atomic entry-pair placement

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
