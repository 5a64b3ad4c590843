//! The set of markets with an open or pending position.
//!
//! Single source of truth for "what are we currently trading". Mutated only
//! by the `PositionEngine`; read by the orchestrator to separate "trade
//! existing" from "discover new". A marketId appears at most once.

use chrono::{DateTime, Utc};
use ouhedge_core::{CurrentOrder, MarketId, Odds, SelectionId, Side, Stake};
use std::collections::BTreeMap;
use tracing::info;

/// Lifecycle state of one managed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    /// Entry pair placed, no fills observed yet.
    Pending,
    /// Exactly one leg has matched; the stop-loss clock is running.
    SingleLegFilled,
    /// Terminal: both legs matched, position closed as designed.
    BothLegsFilled,
    /// Terminal: orders vanished externally or the entry pair never matched.
    Unwound,
}

/// Snapshot of the matched leg, used for stop-loss timing and hedge math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilledLeg {
    pub side: Side,
    pub price: Odds,
    pub size: Stake,
    pub at: DateTime<Utc>,
}

/// One market under active management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub state: PositionState,
    pub filled: Option<FilledLeg>,
}

impl Position {
    /// A freshly entered position with no fills observed.
    pub fn pending(market_id: MarketId, selection_id: SelectionId) -> Self {
        Self {
            market_id,
            selection_id,
            state: PositionState::Pending,
            filled: None,
        }
    }
}

/// Registry of managed positions, keyed by market.
#[derive(Debug, Default)]
pub struct PositionRegistry {
    positions: BTreeMap<MarketId, Position>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, market_id: &MarketId) -> bool {
        self.positions.contains_key(market_id)
    }

    pub fn get(&self, market_id: &MarketId) -> Option<&Position> {
        self.positions.get(market_id)
    }

    pub fn get_mut(&mut self, market_id: &MarketId) -> Option<&mut Position> {
        self.positions.get_mut(market_id)
    }

    /// Market ids currently under management, detached from the map so the
    /// engine can mutate while iterating.
    pub fn market_ids(&self) -> Vec<MarketId> {
        self.positions.keys().cloned().collect()
    }

    /// Insert a position. Returns `false` (and leaves the registry
    /// untouched) if the market is already tracked.
    pub fn insert(&mut self, position: Position) -> bool {
        if self.positions.contains_key(&position.market_id) {
            return false;
        }
        self.positions.insert(position.market_id.clone(), position);
        true
    }

    pub fn remove(&mut self, market_id: &MarketId) -> Option<Position> {
        self.positions.remove(market_id)
    }

    /// Seed the registry from the exchange's live order list at startup.
    ///
    /// Any market with an unmatched order is resumed as a pending position,
    /// so a restart continues management without double-entering.
    pub fn bootstrap(&mut self, orders: &[CurrentOrder]) -> usize {
        let before = self.positions.len();
        for order in orders {
            if order.is_unmatched() {
                self.insert(Position::pending(order.market_id.clone(), order.selection_id));
            }
        }
        let resumed = self.positions.len() - before;
        if resumed > 0 {
            info!(resumed, "Resumed positions from live unmatched orders");
        }
        resumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn market(id: &str) -> MarketId {
        MarketId::new(id)
    }

    fn order(market_id: &str, matched: rust_decimal::Decimal) -> CurrentOrder {
        CurrentOrder {
            bet_id: "b".to_string(),
            market_id: market(market_id),
            selection_id: SelectionId(7),
            side: Side::Back,
            price: Odds::new(dec!(2.6)),
            size: Stake::new(dec!(2.0)),
            size_matched: Stake::new(matched),
            size_remaining: Stake::new(dec!(2.0) - matched),
            placed_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_duplicate_market_ids() {
        let mut registry = PositionRegistry::new();
        assert!(registry.insert(Position::pending(market("1.1"), SelectionId(7))));
        assert!(!registry.insert(Position::pending(market("1.1"), SelectionId(8))));
        assert_eq!(registry.len(), 1);
        // first insert wins
        assert_eq!(registry.get(&market("1.1")).unwrap().selection_id, SelectionId(7));
    }

    #[test]
    fn test_remove() {
        let mut registry = PositionRegistry::new();
        registry.insert(Position::pending(market("1.1"), SelectionId(7)));
        assert!(registry.remove(&market("1.1")).is_some());
        assert!(registry.is_empty());
        assert!(registry.remove(&market("1.1")).is_none());
    }

    #[test]
    fn test_bootstrap_resumes_unmatched_only() {
        let mut registry = PositionRegistry::new();
        let resumed = registry.bootstrap(&[
            order("1.1", dec!(0)),   // unmatched: resumed
            order("1.2", dec!(2.0)), // fully matched: not resumed
            order("1.1", dec!(0)),   // duplicate market: ignored
        ]);
        assert_eq!(resumed, 1);
        assert!(registry.contains(&market("1.1")));
        assert!(!registry.contains(&market("1.2")));
    }
}
