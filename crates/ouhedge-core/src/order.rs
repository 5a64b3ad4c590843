//! Order-side records returned by the exchange.

use crate::decimal::{Odds, Stake};
use crate::market::{MarketId, SelectionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of an order: back (for) or lay (against) a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Back,
    Lay,
}

impl Side {
    /// The hedge leg of a pair sits on the opposite side of the entry leg.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Back => Self::Lay,
            Self::Lay => Self::Back,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Back => write!(f, "BACK"),
            Self::Lay => write!(f, "LAY"),
        }
    }
}

/// A live order as reported by the exchange's current-order listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentOrder {
    pub bet_id: String,
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub side: Side,
    pub price: Odds,
    pub size: Stake,
    pub size_matched: Stake,
    pub size_remaining: Stake,
    pub placed_at: DateTime<Utc>,
}

impl CurrentOrder {
    /// The leg has matched in full.
    pub fn is_fully_matched(&self) -> bool {
        self.size_remaining.is_zero()
    }

    /// Nothing of the leg has matched.
    pub fn is_unmatched(&self) -> bool {
        self.size_matched.is_zero()
    }
}

/// Transient per-iteration view of account funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFunds {
    /// Balance available to bet.
    pub available: Decimal,
    /// Current exposure across open positions.
    pub exposure: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(matched: Decimal, remaining: Decimal) -> CurrentOrder {
        CurrentOrder {
            bet_id: "b1".to_string(),
            market_id: MarketId::new("1.1"),
            selection_id: SelectionId(7),
            side: Side::Back,
            price: Odds::new(dec!(2.6)),
            size: Stake::new(dec!(2.0)),
            size_matched: Stake::new(matched),
            size_remaining: Stake::new(remaining),
            placed_at: Utc::now(),
        }
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Back.opposite(), Side::Lay);
        assert_eq!(Side::Lay.opposite(), Side::Back);
    }

    #[test]
    fn test_fill_predicates() {
        assert!(order(dec!(2.0), dec!(0)).is_fully_matched());
        assert!(!order(dec!(2.0), dec!(0)).is_unmatched());
        assert!(order(dec!(0), dec!(2.0)).is_unmatched());
        assert!(!order(dec!(1.0), dec!(1.0)).is_fully_matched());
    }
}
