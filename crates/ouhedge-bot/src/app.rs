//! Main application orchestration.
//!
//! One iteration per tick: refresh the session, read funds, advance existing
//! positions, then discover and enter new markets. Existing-position work
//! always runs before discovery so capital committed to live positions is
//! managed before new risk is taken on.

use crate::config::{AppConfig, ScheduleConfig};
use crate::error::AppResult;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use ouhedge_exchange::{ExchangeClient, RestClient, SessionTokenManager};
use ouhedge_position::{entry_stake, PositionEngine, PositionRegistry, SizingConfig, StopLossPolicy};
use ouhedge_screener::MarketScreener;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Drives one full trading cycle per invocation.
///
/// Owns all cross-tick mutable state (session, registry); the client is
/// passed in per call so tests can script it.
pub struct IterationOrchestrator {
    session: SessionTokenManager,
    screener: MarketScreener,
    engine: PositionEngine,
    registry: PositionRegistry,
    sizing: SizingConfig,
    schedule: ScheduleConfig,
}

impl IterationOrchestrator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            session: SessionTokenManager::new(config.schedule.session_validity_minutes),
            screener: MarketScreener::new(config.screener.clone()),
            engine: PositionEngine::new(
                StopLossPolicy::new(config.stop_loss.clone()),
                config.sizing.clone(),
            ),
            registry: PositionRegistry::new(),
            sizing: config.sizing.clone(),
            schedule: config.schedule.clone(),
        }
    }

    pub fn registry(&self) -> &PositionRegistry {
        &self.registry
    }

    /// Resume management of markets that already have live orders, so a
    /// restart continues where the previous process stopped.
    ///
    /// A failed read here is not fatal: the process starts with an empty
    /// registry and the live-order check on the entry path still prevents
    /// double entry into a market with resting orders.
    pub async fn bootstrap(&mut self, client: &dyn ExchangeClient, now: DateTime<Utc>) {
        if let Err(err) = self.session.ensure_valid(client, now).await {
            warn!(error = %err, "Bootstrap auth failed, starting with an empty registry");
            return;
        }
        match client.current_orders(None).await {
            Ok(orders) => {
                self.registry.bootstrap(&orders);
                info!(positions = self.registry.len(), "Bootstrap complete");
            }
            Err(err) => {
                warn!(error = %err, "Bootstrap order read failed, starting with an empty registry");
            }
        }
    }

    /// One full cycle. An `Err` means the iteration aborted with nothing
    /// mutated beyond what had already completed; the next tick retries.
    pub async fn run_iteration(
        &mut self,
        client: &dyn ExchangeClient,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let started = Instant::now();

        self.session.ensure_valid(client, now).await?;
        let funds = client.account_funds().await?;
        let stake = entry_stake(funds.available, &self.sizing);

        self.engine
            .advance_all(&mut self.registry, client, now)
            .await;

        if funds.available >= self.sizing.min_stake {
            self.discover_and_enter(client, now, stake).await;
        } else {
            debug!(available = %funds.available, "Balance below minimum stake, skipping discovery");
        }

        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            balance = %funds.available,
            exposure = %funds.exposure,
            positions = self.registry.len(),
            "Iteration complete"
        );
        Ok(())
    }

    /// Find imminent events, screen their markets and open entries.
    /// Per-item failures never stop the rest of the batch.
    async fn discover_and_enter(
        &mut self,
        client: &dyn ExchangeClient,
        now: DateTime<Utc>,
        stake: ouhedge_core::Stake,
    ) {
        let until = now + ChronoDuration::minutes(self.schedule.lookahead_minutes);
        let events = match client.list_events(&self.schedule.sport_id, until).await {
            Ok(events) => events,
            Err(err) => {
                warn!(error = %err, "Event listing failed, skipping discovery");
                return;
            }
        };

        for event in &events {
            if let Some(reject) = self.screener.screen_event(event, now) {
                debug!(event = %event.name, %reject, "Event screened out");
                continue;
            }

            let markets = match client
                .market_catalogue(&self.schedule.sport_id, &event.id, true)
                .await
            {
                Ok(markets) => markets,
                Err(err) => {
                    warn!(event = %event.name, error = %err, "Catalogue fetch failed, skipping event");
                    continue;
                }
            };

            for market in &markets {
                let tracked = self.registry.contains(&market.market_id);
                if let Some(reject) = self.screener.screen_market(market, tracked) {
                    debug!(market = %market.market_name, %reject, "Market screened out");
                    continue;
                }

                match self
                    .engine
                    .try_enter(&mut self.registry, client, &self.screener, event, market, stake)
                    .await
                {
                    Ok(_) => {}
                    Err(err) => {
                        warn!(market_id = %market.market_id, error = %err, "Entry attempt failed");
                    }
                }
            }
        }
    }
}

/// Main application: a REST client plus the orchestrator on a fixed tick.
pub struct Application {
    client: RestClient,
    orchestrator: IterationOrchestrator,
    tick: Duration,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let client = RestClient::new(config.exchange.clone())?;
        let tick = Duration::from_secs(config.schedule.tick_secs);
        Ok(Self {
            client,
            orchestrator: IterationOrchestrator::new(&config),
            tick,
        })
    }

    /// Run until the process is stopped.
    ///
    /// The iteration is awaited on this task, so ticks can never overlap;
    /// an iteration that overruns the interval just delays the next tick.
    pub async fn run(&mut self) -> AppResult<()> {
        self.orchestrator.bootstrap(&self.client, Utc::now()).await;

        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let started = Instant::now();

            if let Err(err) = self
                .orchestrator
                .run_iteration(&self.client, Utc::now())
                .await
            {
                warn!(error = %err, "Iteration aborted");
            }

            let elapsed = started.elapsed();
            if elapsed > self.tick {
                warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    tick_ms = self.tick.as_millis() as u64,
                    "Iteration overran the tick interval"
                );
            }
        }
    }
}
