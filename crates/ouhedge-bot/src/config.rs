//! Application configuration.

use crate::error::{AppError, AppResult};
use ouhedge_exchange::RestConfig;
use ouhedge_position::{SizingConfig, StopLossConfig};
use ouhedge_screener::ScreenerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Iteration scheduling and discovery window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between iterations.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Events starting within this many minutes are fetched for screening.
    #[serde(default = "default_lookahead_minutes")]
    pub lookahead_minutes: i64,
    /// Exchange sport identifier ("1" is football).
    #[serde(default = "default_sport_id")]
    pub sport_id: String,
    /// Session token validity window in minutes. Kept shorter than the
    /// exchange's real grant lifetime so refresh always happens first.
    #[serde(default = "default_session_validity_minutes")]
    pub session_validity_minutes: i64,
}

fn default_tick_secs() -> u64 {
    10
}

fn default_lookahead_minutes() -> i64 {
    10
}

fn default_sport_id() -> String {
    "1".to_string()
}

fn default_session_validity_minutes() -> i64 {
    10
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            lookahead_minutes: default_lookahead_minutes(),
            sport_id: default_sport_id(),
            session_validity_minutes: default_session_validity_minutes(),
        }
    }
}

/// Application configuration. Immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exchange endpoints and app key. Credentials come from the
    /// `OUHEDGE_USERNAME` / `OUHEDGE_PASSWORD` environment at login time.
    #[serde(default = "default_exchange")]
    pub exchange: RestConfig,
    /// Entry sizing and pair math.
    #[serde(default)]
    pub sizing: SizingConfig,
    /// Event/market eligibility thresholds.
    #[serde(default)]
    pub screener: ScreenerConfig,
    /// Time-decayed stop-loss parameters.
    #[serde(default)]
    pub stop_loss: StopLossConfig,
    /// Tick interval and discovery window.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_exchange() -> RestConfig {
    RestConfig {
        betting_url: "https://api.betfair.com/exchange/betting/json-rpc/v1".to_string(),
        accounts_url: "https://api.betfair.com/exchange/account/json-rpc/v1".to_string(),
        login_url: "https://identitysso.betfair.com/api/login".to_string(),
        app_key: String::new(),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exchange: default_exchange(),
            sizing: SizingConfig::default(),
            screener: ScreenerConfig::default(),
            stop_loss: StopLossConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults if the file is absent.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("OUHEDGE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.schedule.tick_secs, 10);
        assert_eq!(config.schedule.lookahead_minutes, 10);
        // kept well inside the exchange's real grant lifetime
        assert_eq!(config.schedule.session_validity_minutes, 10);
        assert_eq!(config.sizing.target_profit_fraction, dec!(0.16));
        assert_eq!(config.stop_loss.threshold_minutes, 16);
        assert_eq!(
            config.screener.tradeable_markets,
            vec!["Over/Under 2.5 Goals".to_string()]
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [exchange]
            betting_url = "https://example.test/betting"
            accounts_url = "https://example.test/accounts"
            login_url = "https://example.test/login"
            app_key = "key123"

            [stop_loss]
            threshold_minutes = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.exchange.app_key, "key123");
        assert_eq!(config.stop_loss.threshold_minutes, 20);
        // unspecified sections and fields fall back to defaults
        assert_eq!(config.stop_loss.step_secs, 10);
        assert_eq!(config.screener.overround_ceiling, dec!(105));
        assert_eq!(config.schedule.sport_id, "1");
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = AppConfig::from_file("/nonexistent/ouhedge.toml").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("tick_secs"));
        assert!(toml_str.contains("betting_url"));
    }

    #[test]
    fn test_credentials_never_in_config() {
        let toml_str = toml::to_string(&AppConfig::default()).unwrap();
        assert!(!toml_str.contains("username"));
        assert!(!toml_str.contains("password"));
    }
}
