//! Thin REST implementation of the exchange capability surface.
//!
//! Speaks the exchange's JSON-RPC betting/accounts endpoints and the form
//! login endpoint. Responses are validated into typed records at this
//! boundary; malformed payloads fail fast instead of surfacing deep in the
//! engine. No retry or backoff lives here.

use crate::client::{EntryPair, ExchangeClient, HedgeOrder};
use crate::error::{AuthError, ExchangeError, ExchangeResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ouhedge_core::{
    AccountFunds, CurrentOrder, Event, EventId, MarketBook, MarketId, MarketInfo, Odds, Runner,
    RunnerBook, SelectionId, Side, Stake,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint and credential configuration for the REST client.
///
/// Username and password are read from `OUHEDGE_USERNAME` /
/// `OUHEDGE_PASSWORD` at login time, never from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Betting JSON-RPC endpoint.
    pub betting_url: String,
    /// Accounts JSON-RPC endpoint.
    pub accounts_url: String,
    /// Interactive login endpoint.
    pub login_url: String,
    /// Application key sent with every request.
    pub app_key: String,
}

/// REST exchange client.
pub struct RestClient {
    http: reqwest::Client,
    config: RestConfig,
    /// Session token shared with the manager; updated once per refresh.
    session_token: RwLock<Option<String>>,
}

impl RestClient {
    pub fn new(config: RestConfig) -> ExchangeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExchangeError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            session_token: RwLock::new(None),
        })
    }

    async fn rpc<P: Serialize, R: DeserializeOwned>(
        &self,
        url: &str,
        method: &str,
        params: P,
    ) -> ExchangeResult<R> {
        let token = self
            .session_token
            .read()
            .clone()
            .ok_or_else(|| ExchangeError::Http("No session token installed".to_string()))?;

        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        debug!(method, "Exchange RPC call");

        let response = self
            .http
            .post(url)
            .header("X-Application", &self.config.app_key)
            .header("X-Authentication", token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExchangeError::Http(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Http(format!("{method}: HTTP {status}")));
        }

        let envelope: RpcEnvelope<R> = response
            .json()
            .await
            .map_err(|e| ExchangeError::MalformedResponse(format!("{method}: {e}")))?;

        match (envelope.result, envelope.error) {
            (Some(result), None) => Ok(result),
            (_, Some(err)) => Err(ExchangeError::Rejected(format!("{method}: {err}"))),
            (None, None) => Err(ExchangeError::MalformedResponse(format!(
                "{method}: empty envelope"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<R> {
    result: Option<R>,
    error: Option<serde_json::Value>,
}

// Wire shapes, validated into core records below.

#[derive(Debug, Deserialize)]
struct RawEventWrapper {
    event: RawEvent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: String,
    name: String,
    open_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarket {
    market_id: String,
    market_name: String,
    #[serde(default)]
    total_matched: rust_decimal::Decimal,
    #[serde(default)]
    runners: Vec<RawRunner>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRunner {
    selection_id: u64,
    runner_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarketBook {
    market_id: String,
    runners: Vec<RawRunnerBook>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRunnerBook {
    selection_id: u64,
    #[serde(default)]
    ex: RawExchangePrices,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExchangePrices {
    #[serde(default)]
    available_to_back: Vec<RawPriceSize>,
    #[serde(default)]
    available_to_lay: Vec<RawPriceSize>,
}

#[derive(Debug, Deserialize)]
struct RawPriceSize {
    price: rust_decimal::Decimal,
    #[allow(dead_code)]
    size: rust_decimal::Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCurrentOrders {
    current_orders: Vec<RawCurrentOrder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCurrentOrder {
    bet_id: String,
    market_id: String,
    selection_id: u64,
    side: Side,
    price_size: RawPriceSizePair,
    size_matched: rust_decimal::Decimal,
    size_remaining: rust_decimal::Decimal,
    placed_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RawPriceSizePair {
    price: rust_decimal::Decimal,
    size: rust_decimal::Decimal,
}

impl From<RawCurrentOrder> for CurrentOrder {
    fn from(raw: RawCurrentOrder) -> Self {
        Self {
            bet_id: raw.bet_id,
            market_id: MarketId::new(raw.market_id),
            selection_id: SelectionId(raw.selection_id),
            side: raw.side,
            price: Odds::new(raw.price_size.price),
            size: Stake::new(raw.price_size.size),
            size_matched: Stake::new(raw.size_matched),
            size_remaining: Stake::new(raw.size_remaining),
            placed_at: raw.placed_date,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAccountFunds {
    available_to_bet_balance: rust_decimal::Decimal,
    exposure: rust_decimal::Decimal,
}

#[derive(Debug, Deserialize)]
struct RawExecutionReport {
    status: String,
}

impl RawExecutionReport {
    fn succeeded(&self) -> bool {
        self.status == "SUCCESS"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLoginResponse {
    login_status: Option<String>,
    session_token: Option<String>,
}

fn limit_order(stake: Stake, price: Odds, fill_or_kill: bool) -> serde_json::Value {
    let mut order = serde_json::json!({
        "size": stake.inner(),
        "price": price.inner(),
        "persistenceType": if fill_or_kill { "LAPSE" } else { "PERSIST" },
    });
    if fill_or_kill {
        order["timeInForce"] = "FILL_OR_KILL".into();
    }
    order
}

fn place_instruction(
    selection_id: SelectionId,
    side: Side,
    stake: Stake,
    price: Odds,
    fill_or_kill: bool,
) -> serde_json::Value {
    serde_json::json!({
        "orderType": "LIMIT",
        "selectionId": selection_id.0,
        "side": side.to_string(),
        "limitOrder": limit_order(stake, price, fill_or_kill),
    })
}

#[async_trait]
impl ExchangeClient for RestClient {
    async fn authenticate(&self) -> Result<String, AuthError> {
        let username = std::env::var("OUHEDGE_USERNAME")
            .map_err(|_| AuthError::MissingCredentials("OUHEDGE_USERNAME".into()))?;
        let password = std::env::var("OUHEDGE_PASSWORD")
            .map_err(|_| AuthError::MissingCredentials("OUHEDGE_PASSWORD".into()))?;

        let response = self
            .http
            .post(&self.config.login_url)
            .header("X-Application", &self.config.app_key)
            .form(&[("username", username.as_str()), ("password", password.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Request(format!("HTTP {status}")));
        }

        let login: RawLoginResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Request(format!("login parse: {e}")))?;

        match (login.login_status.as_deref(), login.session_token) {
            (Some("SUCCESS"), Some(token)) => Ok(token),
            (status, _) => Err(AuthError::Rejected(
                status.unwrap_or("UNKNOWN").to_string(),
            )),
        }
    }

    fn set_session_token(&self, token: &str) {
        *self.session_token.write() = Some(token.to_string());
    }

    async fn account_funds(&self) -> ExchangeResult<AccountFunds> {
        let raw: RawAccountFunds = self
            .rpc(
                &self.config.accounts_url,
                "AccountAPING/v1.0/getAccountFunds",
                serde_json::json!({}),
            )
            .await?;
        Ok(AccountFunds {
            available: raw.available_to_bet_balance,
            exposure: raw.exposure,
        })
    }

    async fn current_orders(
        &self,
        market_id: Option<&MarketId>,
    ) -> ExchangeResult<Vec<CurrentOrder>> {
        let params = match market_id {
            Some(id) => serde_json::json!({ "marketIds": [id.as_str()] }),
            None => serde_json::json!({}),
        };
        let raw: RawCurrentOrders = self
            .rpc(
                &self.config.betting_url,
                "SportsAPING/v1.0/listCurrentOrders",
                params,
            )
            .await?;
        Ok(raw.current_orders.into_iter().map(Into::into).collect())
    }

    async fn list_events(
        &self,
        sport_id: &str,
        until: DateTime<Utc>,
    ) -> ExchangeResult<Vec<Event>> {
        let params = serde_json::json!({
            "filter": {
                "eventTypeIds": [sport_id],
                "marketStartTime": { "to": until.to_rfc3339() },
            }
        });
        let raw: Vec<RawEventWrapper> = self
            .rpc(&self.config.betting_url, "SportsAPING/v1.0/listEvents", params)
            .await?;
        Ok(raw
            .into_iter()
            .map(|w| Event {
                id: EventId::new(w.event.id),
                name: w.event.name,
                open_date: w.event.open_date,
            })
            .collect())
    }

    async fn market_catalogue(
        &self,
        sport_id: &str,
        event_id: &EventId,
        with_runners: bool,
    ) -> ExchangeResult<Vec<MarketInfo>> {
        let projection: &[&str] = if with_runners {
            &["RUNNER_DESCRIPTION"]
        } else {
            &[]
        };
        let params = serde_json::json!({
            "filter": {
                "eventTypeIds": [sport_id],
                "eventIds": [event_id.as_str()],
            },
            "marketProjection": projection,
            "maxResults": "100",
        });
        let raw: Vec<RawMarket> = self
            .rpc(
                &self.config.betting_url,
                "SportsAPING/v1.0/listMarketCatalogue",
                params,
            )
            .await?;
        Ok(raw
            .into_iter()
            .map(|m| MarketInfo {
                market_id: MarketId::new(m.market_id),
                market_name: m.market_name,
                total_matched: m.total_matched,
                runners: m
                    .runners
                    .into_iter()
                    .map(|r| Runner {
                        selection_id: SelectionId(r.selection_id),
                        runner_name: r.runner_name,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn market_book(&self, market_id: &MarketId) -> ExchangeResult<MarketBook> {
        let params = serde_json::json!({
            "marketIds": [market_id.as_str()],
            "priceProjection": { "priceData": ["EX_BEST_OFFERS"] },
        });
        let mut raw: Vec<RawMarketBook> = self
            .rpc(
                &self.config.betting_url,
                "SportsAPING/v1.0/listMarketBook",
                params,
            )
            .await?;
        if raw.is_empty() {
            return Err(ExchangeError::MalformedResponse(format!(
                "listMarketBook returned no book for {market_id}"
            )));
        }
        let book = raw.remove(0);
        Ok(MarketBook {
            market_id: MarketId::new(book.market_id),
            runners: book
                .runners
                .into_iter()
                .map(|r| RunnerBook {
                    selection_id: SelectionId(r.selection_id),
                    best_back: r.ex.available_to_back.first().map(|p| Odds::new(p.price)),
                    best_lay: r.ex.available_to_lay.first().map(|p| Odds::new(p.price)),
                })
                .collect(),
        })
    }

    async fn cancel_orders(&self, market_id: &MarketId) -> ExchangeResult<bool> {
        let params = serde_json::json!({ "marketId": market_id.as_str() });
        let report: RawExecutionReport = self
            .rpc(
                &self.config.betting_url,
                "SportsAPING/v1.0/cancelOrders",
                params,
            )
            .await?;
        if !report.succeeded() {
            warn!(market_id = %market_id, status = %report.status, "cancelOrders not successful");
        }
        Ok(report.succeeded())
    }

    async fn place_entry_pair(&self, pair: &EntryPair) -> ExchangeResult<bool> {
        let params = serde_json::json!({
            "marketId": pair.market_id.as_str(),
            "customerRef": customer_ref(),
            "instructions": [
                place_instruction(pair.selection_id, Side::Back, pair.stake, pair.price, true),
                place_instruction(
                    pair.selection_id,
                    Side::Lay,
                    pair.hedge_stake,
                    pair.hedge_price,
                    false,
                ),
            ],
        });
        let report: RawExecutionReport = self
            .rpc(
                &self.config.betting_url,
                "SportsAPING/v1.0/placeOrders",
                params,
            )
            .await?;
        Ok(report.succeeded())
    }

    async fn place_hedge_order(&self, order: &HedgeOrder) -> ExchangeResult<bool> {
        let params = serde_json::json!({
            "marketId": order.market_id.as_str(),
            "customerRef": customer_ref(),
            "instructions": [place_instruction(
                order.selection_id,
                order.side,
                order.stake,
                order.price,
                order.fill_or_kill,
            )],
        });
        let report: RawExecutionReport = self
            .rpc(
                &self.config.betting_url,
                "SportsAPING/v1.0/placeOrders",
                params,
            )
            .await?;
        Ok(report.succeeded())
    }
}

/// Unique reference per order action, for idempotent replay detection.
fn customer_ref() -> String {
    let ts = Utc::now().timestamp_millis();
    let uuid_short = &Uuid::new_v4().to_string()[..8];
    format!("ouh_{ts}_{uuid_short}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_current_order_conversion() {
        let raw: RawCurrentOrder = serde_json::from_value(serde_json::json!({
            "betId": "298213",
            "marketId": "1.1556",
            "selectionId": 47972,
            "side": "BACK",
            "priceSize": { "price": 2.6, "size": 2.0 },
            "sizeMatched": 2.0,
            "sizeRemaining": 0.0,
            "placedDate": "2026-08-30T14:00:00.000Z",
        }))
        .unwrap();
        let order: CurrentOrder = raw.into();
        assert_eq!(order.market_id, MarketId::new("1.1556"));
        assert_eq!(order.side, Side::Back);
        assert!(order.is_fully_matched());
        assert_eq!(order.price.inner(), dec!(2.6));
    }

    #[test]
    fn test_market_book_wire_parse() {
        let raw: RawMarketBook = serde_json::from_value(serde_json::json!({
            "marketId": "1.1556",
            "runners": [{
                "selectionId": 47972,
                "ex": {
                    "availableToBack": [{ "price": 2.6, "size": 120.0 }],
                    "availableToLay": [{ "price": 2.64, "size": 80.0 }],
                },
            }],
        }))
        .unwrap();
        assert_eq!(raw.runners[0].ex.available_to_back[0].price, dec!(2.6));
    }

    #[test]
    fn test_malformed_order_is_rejected() {
        // priceSize is required; a payload without it must fail at the boundary
        let result: Result<RawCurrentOrder, _> = serde_json::from_value(serde_json::json!({
            "betId": "298213",
            "marketId": "1.1556",
            "selectionId": 47972,
            "side": "BACK",
            "sizeMatched": 2.0,
            "sizeRemaining": 0.0,
            "placedDate": "2026-08-30T14:00:00.000Z",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_place_instruction_shape() {
        let fok = place_instruction(
            SelectionId(47972),
            Side::Back,
            Stake::new(dec!(2.0)),
            Odds::new(dec!(2.6)),
            true,
        );
        assert_eq!(fok["limitOrder"]["timeInForce"], "FILL_OR_KILL");
        assert_eq!(fok["limitOrder"]["persistenceType"], "LAPSE");
        assert_eq!(fok["side"], "BACK");

        let resting = place_instruction(
            SelectionId(47972),
            Side::Lay,
            Stake::new(dec!(2.32)),
            Odds::new(dec!(2.24)),
            false,
        );
        assert!(resting["limitOrder"].get("timeInForce").is_none());
        assert_eq!(resting["limitOrder"]["persistenceType"], "PERSIST");
    }
}
