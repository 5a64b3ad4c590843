//! Typed records for events, markets and prices.
//!
//! The exchange client validates wire responses into these records at the
//! boundary, so business logic never touches loosely-typed payloads.

use crate::decimal::Odds;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque exchange event identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque exchange market identifier. Unique key for a position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(pub String);

impl MarketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Selection (runner) identifier within a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionId(pub u64);

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A discovered event (e.g. one football fixture).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Scheduled start time of the event.
    pub open_date: DateTime<Utc>,
}

/// One selection inside a market catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub selection_id: SelectionId,
    pub runner_name: String,
}

/// Market catalogue entry for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub market_id: MarketId,
    /// Display name, matched exactly against the tradeable-market list.
    pub market_name: String,
    /// Total volume matched on this market so far.
    pub total_matched: Decimal,
    pub runners: Vec<Runner>,
}

impl MarketInfo {
    /// First listed selection; for over/under markets this is the Under.
    pub fn primary_runner(&self) -> Option<&Runner> {
        self.runners.first()
    }
}

/// Best available prices for one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerBook {
    pub selection_id: SelectionId,
    pub best_back: Option<Odds>,
    pub best_lay: Option<Odds>,
}

/// Best-offer view of a market book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketBook {
    pub market_id: MarketId,
    pub runners: Vec<RunnerBook>,
}

impl MarketBook {
    /// Best back and lay price for a selection.
    ///
    /// Returns `None` if the selection is absent or either side of the
    /// book is empty; an entry cannot be priced without both.
    pub fn best_prices(&self, selection_id: SelectionId) -> Option<(Odds, Odds)> {
        let runner = self.runners.iter().find(|r| r.selection_id == selection_id)?;
        match (runner.best_back, runner.best_lay) {
            (Some(back), Some(lay)) => Some((back, lay)),
            _ => None,
        }
    }
}
