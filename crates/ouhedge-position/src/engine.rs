//! Per-iteration position state machine.
//!
//! Advances every registered market once per tick (open → monitor →
//! stop-loss/hedge → close/remove) and drives the new-entry path for
//! screened markets. Failures never escape a single market's processing;
//! the affected market is simply re-evaluated on the next tick.

use crate::error::Result;
use crate::registry::{FilledLeg, Position, PositionRegistry, PositionState};
use crate::sizing::{plan_entry, SizingConfig};
use crate::stop_loss::StopLossPolicy;
use chrono::{DateTime, Utc};
use ouhedge_core::{CurrentOrder, Event, MarketId, MarketInfo, Side, Stake};
use ouhedge_exchange::{EntryPair, ExchangeClient, HedgeOrder};
use ouhedge_screener::MarketScreener;
use tracing::{debug, info, warn};

/// Orchestrates position transitions against the exchange.
pub struct PositionEngine {
    policy: StopLossPolicy,
    sizing: SizingConfig,
}

impl PositionEngine {
    pub fn new(policy: StopLossPolicy, sizing: SizingConfig) -> Self {
        Self { policy, sizing }
    }

    /// Advance every registered market once.
    ///
    /// Errors are contained per market; a failed cancel or place leaves the
    /// registry entry in place for re-evaluation next tick.
    pub async fn advance_all(
        &self,
        registry: &mut PositionRegistry,
        client: &dyn ExchangeClient,
        now: DateTime<Utc>,
    ) {
        for market_id in registry.market_ids() {
            if let Err(err) = self.advance(registry, client, &market_id, now).await {
                warn!(market_id = %market_id, error = %err, "Position advance failed, retrying next tick");
            }
        }
    }

    /// One state-machine pass for a single market, driven by its open orders:
    /// zero orders → unwound; lone unmatched hedge leg → failed entry pair,
    /// cancel and drop; one filled leg → stop-loss clock; two filled legs →
    /// closed.
    async fn advance(
        &self,
        registry: &mut PositionRegistry,
        client: &dyn ExchangeClient,
        market_id: &MarketId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let orders = match client.current_orders(Some(market_id)).await {
            Ok(orders) => orders,
            Err(err) => {
                // transient lookup failure: no state change this tick
                debug!(market_id = %market_id, error = %err, "Order fetch failed, skipping market");
                return Ok(());
            }
        };

        if orders.is_empty() {
            // fully resolved or closed externally
            if let Some(mut position) = registry.remove(market_id) {
                position.state = PositionState::Unwound;
                info!(market_id = %market_id, "No live orders, position unwound");
            }
            return Ok(());
        }

        if let [order] = orders.as_slice() {
            if order.side == Side::Lay && order.is_unmatched() {
                // the fill-or-kill entry leg never matched; only the passive
                // hedge leg is resting. Cancel it and retry fresh on a later
                // discovery pass.
                info!(market_id = %market_id, "Entry pair did not match, cancelling resting hedge leg");
                if client.cancel_orders(market_id).await? {
                    registry.remove(market_id);
                    info!(market_id = %market_id, "Ceased trading market");
                }
                return Ok(());
            }
        }

        let filled: Vec<&CurrentOrder> = orders.iter().filter(|o| o.is_fully_matched()).collect();
        match filled.as_slice() {
            [leg] => self.hedge_single_fill(registry, client, market_id, leg, now).await,
            [_, _] => {
                if let Some(mut position) = registry.remove(market_id) {
                    position.state = PositionState::BothLegsFilled;
                    info!(market_id = %market_id, "Both legs filled, position closed");
                }
                Ok(())
            }
            _ => Ok(()), // nothing filled yet, keep waiting
        }
    }

    /// Run the stop-loss policy for a single-leg fill and, if it fires,
    /// replace the live hedge. Cancellation must be confirmed before the
    /// revised order goes out, so the stale and revised hedge never rest
    /// together.
    async fn hedge_single_fill(
        &self,
        registry: &mut PositionRegistry,
        client: &dyn ExchangeClient,
        market_id: &MarketId,
        leg: &CurrentOrder,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(position) = registry.get_mut(market_id) {
            position.state = PositionState::SingleLegFilled;
            position.filled = Some(FilledLeg {
                side: leg.side,
                price: leg.price,
                size: leg.size,
                at: leg.placed_at,
            });
        }

        let adjustment = match self.policy.evaluate(
            leg.placed_at,
            now,
            leg.size,
            leg.price,
            self.sizing.target_profit_fraction,
        ) {
            Ok(Some(adjustment)) => adjustment,
            Ok(None) => return Ok(()),
            Err(err) => {
                warn!(market_id = %market_id, error = %err, "Stop-loss price not representable, skipping");
                return Ok(());
            }
        };

        info!(
            market_id = %market_id,
            stake = %adjustment.stake,
            price = %adjustment.price,
            terminal = adjustment.terminal,
            "Stop-loss triggered, revising hedge"
        );

        if !client.cancel_orders(market_id).await? {
            warn!(market_id = %market_id, "Cancel not confirmed, keeping stale hedge until next tick");
            return Ok(());
        }

        let hedge = HedgeOrder {
            market_id: market_id.clone(),
            selection_id: leg.selection_id,
            side: leg.side.opposite(),
            stake: adjustment.stake,
            price: adjustment.price,
            // the terminal floor hedge rests in the book; interim re-hedges
            // are fill-or-kill so the next revision starts clean
            fill_or_kill: !adjustment.terminal,
        };
        let placed = client.place_hedge_order(&hedge).await?;

        if adjustment.terminal {
            if placed {
                registry.remove(market_id);
                info!(market_id = %market_id, "Minimum-stake hedge placed, ceased trading market");
            } else {
                warn!(market_id = %market_id, "Terminal hedge rejected, retrying next tick");
            }
        } else if !placed {
            warn!(market_id = %market_id, "Revised hedge rejected, retrying next tick");
        }
        Ok(())
    }

    /// Attempt a new entry on a screened market.
    ///
    /// Returns `Ok(true)` only when the pair was placed and the market
    /// registered. Lookup failures and gate rejections skip quietly.
    pub async fn try_enter(
        &self,
        registry: &mut PositionRegistry,
        client: &dyn ExchangeClient,
        screener: &MarketScreener,
        event: &Event,
        market: &MarketInfo,
        stake: Stake,
    ) -> Result<bool> {
        // a position may have been opened out-of-band (e.g. directly on the
        // website); live orders mean this market is not ours to enter
        match client.current_orders(Some(&market.market_id)).await {
            Ok(orders) if orders.is_empty() => {}
            Ok(_) => {
                debug!(market_id = %market.market_id, "Live orders present, skipping entry");
                return Ok(false);
            }
            Err(err) => {
                debug!(market_id = %market.market_id, error = %err, "Order check failed, skipping entry");
                return Ok(false);
            }
        }

        let Some(runner) = market.primary_runner() else {
            warn!(market_id = %market.market_id, "Market has no runners, skipping entry");
            return Ok(false);
        };

        let book = match client.market_book(&market.market_id).await {
            Ok(book) => book,
            Err(err) => {
                debug!(market_id = %market.market_id, error = %err, "Book fetch failed, skipping entry");
                return Ok(false);
            }
        };
        let Some((back, lay)) = book.best_prices(runner.selection_id) else {
            debug!(market_id = %market.market_id, "Book missing a side, skipping entry");
            return Ok(false);
        };

        if let Some(reject) = screener.price_gate(back, lay) {
            debug!(market_id = %market.market_id, back = %back, lay = %lay, %reject, "Price gate rejected entry");
            return Ok(false);
        }

        let plan = plan_entry(stake, back, &self.sizing)?;
        let pair = EntryPair {
            market_id: market.market_id.clone(),
            selection_id: runner.selection_id,
            stake: plan.stake,
            price: plan.price,
            hedge_stake: plan.hedge_stake,
            hedge_price: plan.hedge_price,
        };

        info!(
            event = %event.name,
            market = %market.market_name,
            runner = %runner.runner_name,
            stake = %plan.stake,
            back = %plan.price,
            hedge_stake = %plan.hedge_stake,
            hedge_price = %plan.hedge_price,
            "Opening position"
        );

        if client.place_entry_pair(&pair).await? {
            registry.insert(Position::pending(market.market_id.clone(), runner.selection_id));
            Ok(true)
        } else {
            warn!(market_id = %market.market_id, "Entry pair rejected");
            Ok(false)
        }
    }
}
