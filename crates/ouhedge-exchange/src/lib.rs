//! Exchange client seam for the over/under hedging bot.
//!
//! Defines the narrow capability interface the decision engine consumes
//! (`ExchangeClient`), the session-token lifecycle (`SessionTokenManager`),
//! and a thin REST implementation (`RestClient`). All calls are awaited
//! sequentially by the single iteration task; a failed read means "skip this
//! unit of work this iteration", never a process abort.

pub mod client;
pub mod error;
pub mod rest;
pub mod session;

pub use client::{EntryPair, ExchangeClient, HedgeOrder};
pub use error::{AuthError, ExchangeError, ExchangeResult};
pub use rest::{RestClient, RestConfig};
pub use session::SessionTokenManager;
