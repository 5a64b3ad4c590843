//! Session token lifecycle.
//!
//! Tracks token freshness against a validity window deliberately shorter
//! than the exchange's real grant lifetime, and refreshes synchronously
//! before any exchange call in an iteration.

use crate::client::ExchangeClient;
use crate::error::AuthError;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct IssuedToken {
    value: String,
    issued_at: DateTime<Utc>,
}

/// Tracks auth-token freshness and triggers refresh before expiry.
#[derive(Debug)]
pub struct SessionTokenManager {
    validity: Duration,
    token: Option<IssuedToken>,
}

impl SessionTokenManager {
    /// Create a manager with the given validity window in minutes.
    pub fn new(validity_minutes: i64) -> Self {
        Self {
            validity: Duration::minutes(validity_minutes),
            token: None,
        }
    }

    /// Whether the current token is still inside its validity window.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| now < t.issued_at + self.validity)
    }

    /// Return a valid token, refreshing through `client` if needed.
    ///
    /// The stale token is discarded before the refresh is attempted: a
    /// failed refresh leaves the manager empty, aborting the iteration and
    /// forcing re-auth on the next tick.
    pub async fn ensure_valid(
        &mut self,
        client: &dyn ExchangeClient,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        if let Some(token) = &self.token {
            if now < token.issued_at + self.validity {
                return Ok(token.value.clone());
            }
            info!("Session token expired, refreshing");
        }
        self.token = None;

        let value = match client.authenticate().await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "Session refresh failed");
                return Err(err);
            }
        };
        client.set_session_token(&value);
        self.token = Some(IssuedToken {
            value: value.clone(),
            issued_at: now,
        });
        info!("Session token refreshed");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{EntryPair, HedgeOrder};
    use crate::error::{ExchangeError, ExchangeResult};
    use async_trait::async_trait;
    use ouhedge_core::{
        AccountFunds, CurrentOrder, Event, EventId, MarketBook, MarketId, MarketInfo,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Auth-only stub; every non-auth capability is unreachable in these tests.
    struct StubClient {
        fail_auth: bool,
        auth_calls: AtomicUsize,
    }

    impl StubClient {
        fn new(fail_auth: bool) -> Self {
            Self {
                fail_auth,
                auth_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ExchangeClient for StubClient {
        async fn authenticate(&self) -> Result<String, AuthError> {
            let n = self.auth_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_auth {
                Err(AuthError::Rejected("INVALID_USERNAME_OR_PASSWORD".into()))
            } else {
                Ok(format!("token-{n}"))
            }
        }

        fn set_session_token(&self, _token: &str) {}

        async fn account_funds(&self) -> ExchangeResult<AccountFunds> {
            Err(ExchangeError::Http("not under test".into()))
        }

        async fn current_orders(
            &self,
            _market_id: Option<&MarketId>,
        ) -> ExchangeResult<Vec<CurrentOrder>> {
            Err(ExchangeError::Http("not under test".into()))
        }

        async fn list_events(
            &self,
            _sport_id: &str,
            _until: DateTime<Utc>,
        ) -> ExchangeResult<Vec<Event>> {
            Err(ExchangeError::Http("not under test".into()))
        }

        async fn market_catalogue(
            &self,
            _sport_id: &str,
            _event_id: &EventId,
            _with_runners: bool,
        ) -> ExchangeResult<Vec<MarketInfo>> {
            Err(ExchangeError::Http("not under test".into()))
        }

        async fn market_book(&self, _market_id: &MarketId) -> ExchangeResult<MarketBook> {
            Err(ExchangeError::Http("not under test".into()))
        }

        async fn cancel_orders(&self, _market_id: &MarketId) -> ExchangeResult<bool> {
            Err(ExchangeError::Http("not under test".into()))
        }

        async fn place_entry_pair(&self, _pair: &EntryPair) -> ExchangeResult<bool> {
            Err(ExchangeError::Http("not under test".into()))
        }

        async fn place_hedge_order(&self, _order: &HedgeOrder) -> ExchangeResult<bool> {
            Err(ExchangeError::Http("not under test".into()))
        }
    }

    #[tokio::test]
    async fn test_first_call_authenticates() {
        let client = StubClient::new(false);
        let mut manager = SessionTokenManager::new(10);
        let now = Utc::now();

        assert!(!manager.is_valid(now));
        let token = manager.ensure_valid(&client, now).await.unwrap();
        assert_eq!(token, "token-1");
        assert!(manager.is_valid(now));
    }

    #[tokio::test]
    async fn test_fresh_token_is_reused() {
        let client = StubClient::new(false);
        let mut manager = SessionTokenManager::new(10);
        let now = Utc::now();

        let first = manager.ensure_valid(&client, now).await.unwrap();
        let again = manager
            .ensure_valid(&client, now + Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(first, again);
        assert_eq!(client.auth_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes() {
        let client = StubClient::new(false);
        let mut manager = SessionTokenManager::new(10);
        let now = Utc::now();

        manager.ensure_valid(&client, now).await.unwrap();
        let later = now + Duration::minutes(10);
        assert!(!manager.is_valid(later));
        let token = manager.ensure_valid(&client, later).await.unwrap();
        assert_eq!(token, "token-2");
    }

    #[tokio::test]
    async fn test_failed_refresh_discards_token() {
        let client = StubClient::new(true);
        let mut manager = SessionTokenManager::new(10);
        let now = Utc::now();

        assert!(manager.ensure_valid(&client, now).await.is_err());
        // failed refresh leaves the manager empty rather than keeping a
        // stale token around
        assert!(!manager.is_valid(now));
    }
}
