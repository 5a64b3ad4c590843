//! Entry sizing and pair math.
//!
//! New entries risk a fixed fraction of the available balance, floored to
//! the exchange minimum stake. The paired hedge locks in the configured
//! target profit: hedging `stake + targetProfit` at `total / hedgeStake`
//! returns the same amount whichever side wins.

use ouhedge_core::{Odds, Stake, TickLadder};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Entry sizing parameters. Immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Fraction of the available balance staked per entry.
    #[serde(default = "default_balance_fraction")]
    pub balance_fraction: Decimal,
    /// Exchange minimum stake in currency units.
    #[serde(default = "default_min_stake")]
    pub min_stake: Decimal,
    /// Profit targeted by the hedge leg, as a fraction of the entry stake.
    #[serde(default = "default_target_profit_fraction")]
    pub target_profit_fraction: Decimal,
}

fn default_balance_fraction() -> Decimal {
    dec!(0.04)
}

fn default_min_stake() -> Decimal {
    dec!(2.0)
}

fn default_target_profit_fraction() -> Decimal {
    dec!(0.16)
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            balance_fraction: default_balance_fraction(),
            min_stake: default_min_stake(),
            target_profit_fraction: default_target_profit_fraction(),
        }
    }
}

/// Stake for the next entry: `round2(available * fraction)`, floored to the
/// minimum stake.
pub fn entry_stake(available: Decimal, config: &SizingConfig) -> Stake {
    let stake = (available * config.balance_fraction).round_dp(2);
    if stake < config.min_stake {
        Stake::new(config.min_stake)
    } else {
        Stake::new(stake)
    }
}

/// A fully computed entry pair, ready to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPlan {
    pub stake: Stake,
    pub price: Odds,
    pub hedge_stake: Stake,
    pub hedge_price: Odds,
}

/// Compute the paired hedge for an entry at the observed back price.
pub fn plan_entry(
    stake: Stake,
    back: Odds,
    config: &SizingConfig,
) -> ouhedge_core::Result<EntryPlan> {
    let total = stake.payout(back);
    let target_profit = stake * config.target_profit_fraction;
    let hedge_stake = (stake + target_profit).round2();
    let hedge_price = TickLadder.quantize(Odds::new(total / hedge_stake.inner()))?;

    Ok(EntryPlan {
        stake,
        price: back,
        hedge_stake,
        hedge_price,
    })
}
