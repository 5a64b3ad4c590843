//! Core domain types for the over/under hedging bot.
//!
//! This crate provides the fundamental types used throughout the system:
//! - `Odds`, `Stake`: precision-safe numeric types
//! - `TickLadder`: quantization of raw odds to valid exchange ticks
//! - `Event`, `MarketInfo`, `MarketBook`, `CurrentOrder`: typed exchange records
//! - `Side`: back/lay trading enum

pub mod decimal;
pub mod error;
pub mod ladder;
pub mod market;
pub mod order;

pub use decimal::{Odds, Stake};
pub use error::{CoreError, Result};
pub use ladder::TickLadder;
pub use market::{Event, EventId, MarketBook, MarketId, MarketInfo, Runner, RunnerBook, SelectionId};
pub use order::{AccountFunds, CurrentOrder, Side};
