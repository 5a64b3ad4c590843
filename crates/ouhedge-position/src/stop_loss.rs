//! Time-decayed stop-loss policy.
//!
//! A one-sided position that sits unhedged past the threshold has its
//! target profit walked back by one percentage point per whole 10-second
//! step, forcing the exit price toward (and past) breakeven. Once the
//! decayed target would give back more than the full capital return, the
//! hedge multiplier clamps to a fixed 50% fallback instead of decaying
//! further. A revised stake floored to the exchange minimum marks the
//! terminal hedge: after placing it the position is dropped regardless of
//! subsequent match status.

use chrono::{DateTime, Duration, Utc};
use ouhedge_core::{Odds, Stake, TickLadder};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Stop-loss parameters. Immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopLossConfig {
    /// Minutes a single-leg fill may rest before decay starts.
    #[serde(default = "default_threshold_minutes")]
    pub threshold_minutes: i64,
    /// Seconds per decay step.
    #[serde(default = "default_step_secs")]
    pub step_secs: i64,
    /// Profit fraction given up per step (1 percentage point).
    #[serde(default = "default_step_fraction")]
    pub step_fraction: Decimal,
    /// Hedge multiplier used once decay would drop below full capital return.
    #[serde(default = "default_floor_multiplier")]
    pub floor_multiplier: Decimal,
    /// Exchange minimum stake in currency units.
    #[serde(default = "default_min_stake")]
    pub min_stake: Decimal,
}

fn default_threshold_minutes() -> i64 {
    16
}

fn default_step_secs() -> i64 {
    10
}

fn default_step_fraction() -> Decimal {
    dec!(0.01)
}

fn default_floor_multiplier() -> Decimal {
    dec!(0.50)
}

fn default_min_stake() -> Decimal {
    dec!(2.0)
}

impl Default for StopLossConfig {
    fn default() -> Self {
        Self {
            threshold_minutes: default_threshold_minutes(),
            step_secs: default_step_secs(),
            step_fraction: default_step_fraction(),
            floor_multiplier: default_floor_multiplier(),
            min_stake: default_min_stake(),
        }
    }
}

/// Revised hedge produced by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HedgeAdjustment {
    pub stake: Stake,
    pub price: Odds,
    /// The stake hit the exchange minimum: this hedge is the last action
    /// for the market, further decay is pointless.
    pub terminal: bool,
}

/// Computes the decayed hedge for a single-leg fill.
#[derive(Debug, Clone)]
pub struct StopLossPolicy {
    config: StopLossConfig,
    ladder: TickLadder,
}

impl StopLossPolicy {
    pub fn new(config: StopLossConfig) -> Self {
        Self {
            config,
            ladder: TickLadder,
        }
    }

    pub fn config(&self) -> &StopLossConfig {
        &self.config
    }

    /// Evaluate the stop-loss for a leg filled at `filled_at`.
    ///
    /// Returns `Ok(None)` while the fill is inside the threshold window.
    /// Past it, the hedge multiplier starts at `1 + target_profit_fraction`
    /// and decays by `step_fraction` per whole elapsed step; the revised
    /// stake and quantized price are recomputed from the fixed payout of
    /// the filled leg.
    pub fn evaluate(
        &self,
        filled_at: DateTime<Utc>,
        now: DateTime<Utc>,
        size: Stake,
        price: Odds,
        target_profit_fraction: Decimal,
    ) -> ouhedge_core::Result<Option<HedgeAdjustment>> {
        let deadline = filled_at + Duration::minutes(self.config.threshold_minutes);
        if now <= deadline {
            return Ok(None);
        }

        let overage_secs = (now - deadline).num_seconds();
        let steps = overage_secs / self.config.step_secs;

        let mut multiplier =
            Decimal::ONE + target_profit_fraction - self.config.step_fraction * Decimal::from(steps);
        if multiplier < Decimal::ONE {
            multiplier = self.config.floor_multiplier;
        }

        let mut revised = (size * multiplier).round2();
        let mut terminal = false;
        if revised.inner() <= self.config.min_stake {
            revised = Stake::new(self.config.min_stake);
            terminal = true;
        }

        let total = size.payout(price);
        let revised_price = self.ladder.quantize(Odds::new(total / revised.inner()))?;

        Ok(Some(HedgeAdjustment {
            stake: revised,
            price: revised_price,
            terminal,
        }))
    }
}
