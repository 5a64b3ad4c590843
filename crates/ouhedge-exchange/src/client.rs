//! The capability interface consumed by the decision engine.

use crate::error::{AuthError, ExchangeResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ouhedge_core::{
    AccountFunds, CurrentOrder, Event, EventId, MarketBook, MarketId, MarketInfo, Odds,
    SelectionId, Side, Stake,
};

/// An all-or-nothing entry pair: a fill-or-kill entry leg and its contingent
/// hedge leg, submitted as a single atomic intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPair {
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub stake: Stake,
    pub price: Odds,
    pub hedge_stake: Stake,
    pub hedge_price: Odds,
}

/// A single hedge order, placed when the stop-loss policy revises the exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HedgeOrder {
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub side: Side,
    pub stake: Stake,
    pub price: Odds,
    /// Fill-or-kill for re-hedges that will be revised again; the terminal
    /// floor hedge rests in the book instead.
    pub fill_or_kill: bool,
}

/// Narrow exchange capability surface.
///
/// Every method is a single synchronous-from-the-engine's-perspective call;
/// there is no retry or backoff at this layer.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Obtain a fresh session token.
    async fn authenticate(&self) -> Result<String, AuthError>;

    /// Install the session token used by subsequent calls.
    fn set_session_token(&self, token: &str);

    /// Available-to-bet balance and exposure.
    async fn account_funds(&self) -> ExchangeResult<AccountFunds>;

    /// Live orders, optionally restricted to one market.
    async fn current_orders(&self, market_id: Option<&MarketId>)
        -> ExchangeResult<Vec<CurrentOrder>>;

    /// Events of a sport starting before `until`.
    async fn list_events(&self, sport_id: &str, until: DateTime<Utc>)
        -> ExchangeResult<Vec<Event>>;

    /// Market catalogue for one event.
    async fn market_catalogue(
        &self,
        sport_id: &str,
        event_id: &EventId,
        with_runners: bool,
    ) -> ExchangeResult<Vec<MarketInfo>>;

    /// Best available back/lay prices for a market.
    async fn market_book(&self, market_id: &MarketId) -> ExchangeResult<MarketBook>;

    /// Cancel all live orders in a market. `true` only on confirmed success.
    async fn cancel_orders(&self, market_id: &MarketId) -> ExchangeResult<bool>;

    /// Place an entry pair atomically. `true` only on confirmed success.
    async fn place_entry_pair(&self, pair: &EntryPair) -> ExchangeResult<bool>;

    /// Place a revised hedge order. `true` only on confirmed success.
    async fn place_hedge_order(&self, order: &HedgeOrder) -> ExchangeResult<bool>;
}
