//! Market eligibility filtering.
//!
//! Decides whether a discovered event/market qualifies for new-position
//! entry: placement time window, excluded-team block list, liquidity floor,
//! market-name match, and the back-price/overround gate. Every check is
//! per-item; one rejected event never short-circuits the rest of the batch.

use chrono::{DateTime, Duration, Utc};
use ouhedge_core::{Event, MarketInfo, Odds};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Eligibility thresholds and lists. Immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Events starting later than now + this many minutes are not entered yet.
    #[serde(default = "default_placement_deadline_minutes")]
    pub placement_deadline_minutes: i64,
    /// Minimum total matched volume for a market to be considered liquid.
    #[serde(default = "default_matched_volume_floor")]
    pub matched_volume_floor: Decimal,
    /// Exclusive lower bound for the entry back price.
    #[serde(default = "default_min_back_price")]
    pub min_back_price: Decimal,
    /// Exclusive upper bound for the entry back price.
    #[serde(default = "default_max_back_price")]
    pub max_back_price: Decimal,
    /// Exclusive ceiling for `lay / back * 100`.
    #[serde(default = "default_overround_ceiling")]
    pub overround_ceiling: Decimal,
    /// Display names of markets eligible for trading (exact match).
    #[serde(default = "default_tradeable_markets")]
    pub tradeable_markets: Vec<String>,
    /// Case-sensitive substrings; events whose name contains any are skipped.
    #[serde(default)]
    pub excluded_teams: Vec<String>,
}

fn default_placement_deadline_minutes() -> i64 {
    2
}

fn default_matched_volume_floor() -> Decimal {
    Decimal::from(1000)
}

fn default_min_back_price() -> Decimal {
    rust_decimal_macros::dec!(1.6)
}

fn default_max_back_price() -> Decimal {
    rust_decimal_macros::dec!(2.8)
}

fn default_overround_ceiling() -> Decimal {
    Decimal::from(105)
}

fn default_tradeable_markets() -> Vec<String> {
    vec!["Over/Under 2.5 Goals".to_string()]
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            placement_deadline_minutes: default_placement_deadline_minutes(),
            matched_volume_floor: default_matched_volume_floor(),
            min_back_price: default_min_back_price(),
            max_back_price: default_max_back_price(),
            overround_ceiling: default_overround_ceiling(),
            tradeable_markets: default_tradeable_markets(),
            excluded_teams: Vec::new(),
        }
    }
}

/// Why an event was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventReject {
    /// Event name contains this excluded substring.
    ExcludedTeam(String),
    /// Event starts beyond the placement deadline window.
    StartsTooLate,
}

impl fmt::Display for EventReject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcludedTeam(team) => write!(f, "excluded team '{team}'"),
            Self::StartsTooLate => write!(f, "starts beyond placement deadline"),
        }
    }
}

/// Why a market was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketReject {
    /// A position is already open or pending on this market.
    AlreadyTracked,
    /// Total matched volume below the liquidity floor.
    Illiquid,
    /// Display name is not on the tradeable-market list.
    NameMismatch,
}

impl fmt::Display for MarketReject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyTracked => write!(f, "already tracked"),
            Self::Illiquid => write!(f, "below liquidity floor"),
            Self::NameMismatch => write!(f, "market name not tradeable"),
        }
    }
}

/// Why a priced market failed the entry gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceReject {
    /// Back price outside the configured (min, max) band.
    BackPriceOutOfBand,
    /// Implied overround at or above the ceiling (excessive spread).
    OverroundTooHigh,
}

impl fmt::Display for PriceReject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackPriceOutOfBand => write!(f, "back price out of band"),
            Self::OverroundTooHigh => write!(f, "overround above ceiling"),
        }
    }
}

/// Decides whether a discovered event/market qualifies for entry.
#[derive(Debug, Clone)]
pub struct MarketScreener {
    config: ScreenerConfig,
}

impl MarketScreener {
    pub fn new(config: ScreenerConfig) -> Self {
        Self { config }
    }

    /// Event-level gate: block list and placement window.
    pub fn screen_event(&self, event: &Event, now: DateTime<Utc>) -> Option<EventReject> {
        if let Some(team) = self
            .config
            .excluded_teams
            .iter()
            .find(|team| event.name.contains(team.as_str()))
        {
            return Some(EventReject::ExcludedTeam(team.clone()));
        }

        let deadline = now + Duration::minutes(self.config.placement_deadline_minutes);
        if event.open_date > deadline {
            return Some(EventReject::StartsTooLate);
        }
        None
    }

    /// Market-level gate: registry membership, liquidity, name match.
    pub fn screen_market(&self, market: &MarketInfo, already_tracked: bool) -> Option<MarketReject> {
        if already_tracked {
            return Some(MarketReject::AlreadyTracked);
        }
        if market.total_matched < self.config.matched_volume_floor {
            return Some(MarketReject::Illiquid);
        }
        if !self
            .config
            .tradeable_markets
            .iter()
            .any(|name| name == &market.market_name)
        {
            return Some(MarketReject::NameMismatch);
        }
        None
    }

    /// Price gate: back strictly inside the band, overround strictly below
    /// the ceiling.
    pub fn price_gate(&self, back: Odds, lay: Odds) -> Option<PriceReject> {
        let back_px = back.inner();
        if back_px <= self.config.min_back_price || back_px >= self.config.max_back_price {
            return Some(PriceReject::BackPriceOutOfBand);
        }
        match Odds::overround(back, lay) {
            Some(overround) if overround < self.config.overround_ceiling => None,
            _ => Some(PriceReject::OverroundTooHigh),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ouhedge_core::{EventId, MarketId, Runner, SelectionId};
    use rust_decimal_macros::dec;

    fn screener(excluded: &[&str]) -> MarketScreener {
        MarketScreener::new(ScreenerConfig {
            excluded_teams: excluded.iter().map(|s| s.to_string()).collect(),
            ..ScreenerConfig::default()
        })
    }

    fn event(name: &str, starts_in_minutes: i64, now: DateTime<Utc>) -> Event {
        Event {
            id: EventId::new("29123"),
            name: name.to_string(),
            open_date: now + Duration::minutes(starts_in_minutes),
        }
    }

    fn market(name: &str, matched: Decimal) -> MarketInfo {
        MarketInfo {
            market_id: MarketId::new("1.1556"),
            market_name: name.to_string(),
            total_matched: matched,
            runners: vec![Runner {
                selection_id: SelectionId(47972),
                runner_name: "Under 2.5 Goals".to_string(),
            }],
        }
    }

    #[test]
    fn test_excluded_team_substring_rejects() {
        let now = Utc::now();
        let screener = screener(&["Ajax", "PSV"]);
        let reject = screener
            .screen_event(&event("Ajax v Heerenveen", 1, now), now)
            .unwrap();
        assert_eq!(reject, EventReject::ExcludedTeam("Ajax".to_string()));
    }

    #[test]
    fn test_exclusion_is_case_sensitive() {
        let now = Utc::now();
        let screener = screener(&["ajax"]);
        assert!(screener
            .screen_event(&event("Ajax v Heerenveen", 1, now), now)
            .is_none());
    }

    #[test]
    fn test_exclusion_across_list_configurations() {
        let now = Utc::now();
        let name = "Celtic v Rangers";
        for excluded in [
            vec!["Celtic"],
            vec!["Rangers"],
            vec!["Dundee", "Rangers"],
            vec!["v "],
        ] {
            let screener = screener(&excluded);
            assert!(
                screener.screen_event(&event(name, 1, now), now).is_some(),
                "block list {excluded:?} failed to reject '{name}'"
            );
        }
    }

    #[test]
    fn test_event_beyond_placement_deadline_rejects() {
        let now = Utc::now();
        let screener = screener(&[]);
        assert_eq!(
            screener.screen_event(&event("A v B", 30, now), now),
            Some(EventReject::StartsTooLate)
        );
        // default deadline is 2 minutes; a kickoff 1 minute out is fine
        assert!(screener.screen_event(&event("A v B", 1, now), now).is_none());
    }

    #[test]
    fn test_market_gates() {
        let screener = screener(&[]);
        let eligible = market("Over/Under 2.5 Goals", dec!(1500));

        assert!(screener.screen_market(&eligible, false).is_none());
        assert_eq!(
            screener.screen_market(&eligible, true),
            Some(MarketReject::AlreadyTracked)
        );
        assert_eq!(
            screener.screen_market(&market("Over/Under 2.5 Goals", dec!(999)), false),
            Some(MarketReject::Illiquid)
        );
        assert_eq!(
            screener.screen_market(&market("Match Odds", dec!(1500)), false),
            Some(MarketReject::NameMismatch)
        );
    }

    #[test]
    fn test_market_name_must_match_exactly() {
        let screener = screener(&[]);
        assert_eq!(
            screener.screen_market(&market("Over/Under 2.5 Goals ", dec!(1500)), false),
            Some(MarketReject::NameMismatch)
        );
    }

    #[test]
    fn test_price_gate_band_is_exclusive() {
        let screener = screener(&[]);
        let lay = Odds::new(dec!(2.0));

        // band is (1.6, 2.8)
        assert_eq!(
            screener.price_gate(Odds::new(dec!(1.6)), lay),
            Some(PriceReject::BackPriceOutOfBand)
        );
        assert_eq!(
            screener.price_gate(Odds::new(dec!(2.8)), lay),
            Some(PriceReject::BackPriceOutOfBand)
        );
        assert!(screener.price_gate(Odds::new(dec!(2.0)), lay).is_none());
    }

    #[test]
    fn test_price_gate_overround_ceiling() {
        let screener = screener(&[]);
        let back = Odds::new(dec!(2.0));

        // 2.12 / 2.0 * 100 = 106, at-or-above the 105 ceiling
        assert_eq!(
            screener.price_gate(back, Odds::new(dec!(2.12))),
            Some(PriceReject::OverroundTooHigh)
        );
        // exactly 105 is still rejected (strictly below required)
        assert_eq!(
            screener.price_gate(back, Odds::new(dec!(2.10))),
            Some(PriceReject::OverroundTooHigh)
        );
        // 2.08 / 2.0 * 100 = 104
        assert!(screener.price_gate(back, Odds::new(dec!(2.08))).is_none());
    }
}
