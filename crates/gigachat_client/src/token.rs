//! Lazily refreshed bearer-token cache for the credential exchange.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::retry::RetryPolicy;
use crate::{GigaChatApi, GigaChatError};

/// Seconds subtracted from the advertised TTL so a token is refreshed
/// before the service actually rejects it.
pub const SAFETY_MARGIN_SECS: i64 = 60;

/// Time source used by [`TokenCache`]; injectable so tests can drive
/// expiry with a fake clock.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct CachedToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

/// Single-entry token cache over the credential exchange.
///
/// The slot is empty until first use, valid while `expires_at` lies in the
/// future and expired afterwards; [`TokenCache::invalidate`] empties it
/// regardless of the recorded expiry. The slot lock is held across a
/// refresh, so concurrent callers share one exchange.
pub struct TokenCache {
    exchange: Arc<dyn GigaChatApi>,
    policy: RetryPolicy,
    clock: Clock,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(exchange: Arc<dyn GigaChatApi>, policy: RetryPolicy) -> Self {
        Self::with_clock(exchange, policy, Arc::new(Utc::now))
    }

    pub fn with_clock(exchange: Arc<dyn GigaChatApi>, policy: RetryPolicy, clock: Clock) -> Self {
        Self {
            exchange,
            policy,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached token, refreshing it through the retry policy when
    /// the slot is empty or expired. Exhausted retries surface the last
    /// exchange error; falling back is the caller's responsibility.
    pub async fn get(&self) -> Result<SecretString, GigaChatError> {
        let mut slot = self.slot.lock().await;
        let now = (self.clock)();
        if let Some(cached) = slot.as_ref() {
            if cached.expires_at > now {
                return Ok(cached.value.clone());
            }
            tracing::debug!("cached token expired, refreshing");
        }

        let resp = self
            .policy
            .retry_async(|| self.exchange.exchange_token())
            .await?;
        tracing::debug!("token exchange succeeded, ttl {}s", resp.expires_in);

        let now = (self.clock)();
        let cached = CachedToken {
            value: SecretString::new(resp.access_token.into()),
            expires_at: now + Duration::seconds(resp.expires_in - SAFETY_MARGIN_SECS),
        };
        let value = cached.value.clone();
        *slot = Some(cached);
        Ok(value)
    }

    /// Drop the cached token so the next [`TokenCache::get`] refreshes.
    /// Called when a consumer saw a 401 from the completion API.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            tracing::info!("cached token invalidated after auth rejection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenResponse;
    use async_trait::async_trait;
    use secrecy::ExposeSecret;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingExchange {
        calls: AtomicU32,
        expires_in: i64,
        fail: bool,
    }

    impl CountingExchange {
        fn new(expires_in: i64) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                expires_in,
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                expires_in: 0,
                fail: true,
            })
        }
    }

    #[async_trait]
    impl GigaChatApi for CountingExchange {
        async fn exchange_token(&self) -> Result<TokenResponse, GigaChatError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(GigaChatError::Config("exchange down".into()));
            }
            Ok(TokenResponse {
                access_token: format!("tok-{n}"),
                expires_in: self.expires_in,
            })
        }

        async fn complete(
            &self,
            _token: &SecretString,
            _prompt: &str,
        ) -> Result<String, GigaChatError> {
            unimplemented!()
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(2),
        }
    }

    fn manual_clock(start: DateTime<Utc>) -> (Clock, Arc<std::sync::Mutex<DateTime<Utc>>>) {
        let now = Arc::new(std::sync::Mutex::new(start));
        let handle = now.clone();
        let clock: Clock = Arc::new(move || *now.lock().unwrap());
        (clock, handle)
    }

    fn start_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn fresh_token_is_fetched_and_cached() {
        let exchange = CountingExchange::new(3600);
        let (clock, _) = manual_clock(start_time());
        let cache = TokenCache::with_clock(exchange.clone(), fast_policy(), clock);

        let first = cache.get().await.expect("token");
        let second = cache.get().await.expect("token");
        assert_eq!(first.expose_secret(), "tok-1");
        assert_eq!(second.expose_secret(), "tok-1");
        assert_eq!(exchange.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_within_margin_is_refreshed() {
        let exchange = CountingExchange::new(3600);
        let (clock, handle) = manual_clock(start_time());
        let cache = TokenCache::with_clock(exchange.clone(), fast_policy(), clock);

        let first = cache.get().await.expect("token");
        assert_eq!(first.expose_secret(), "tok-1");

        // 3500s elapsed: within expires_in - margin, still cached.
        *handle.lock().unwrap() = start_time() + Duration::seconds(3500);
        let cached = cache.get().await.expect("token");
        assert_eq!(cached.expose_secret(), "tok-1");
        assert_eq!(exchange.calls.load(Ordering::SeqCst), 1);

        // 3541s elapsed: past expires_in - 60s, must refresh.
        *handle.lock().unwrap() = start_time() + Duration::seconds(3541);
        let refreshed = cache.get().await.expect("token");
        assert_eq!(refreshed.expose_secret(), "tok-2");
        assert_eq!(exchange.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_discards_cached_token() {
        let exchange = CountingExchange::new(3600);
        let (clock, _) = manual_clock(start_time());
        let cache = TokenCache::with_clock(exchange.clone(), fast_policy(), clock);

        let first = cache.get().await.expect("token");
        cache.invalidate().await;
        let second = cache.get().await.expect("token");

        assert_eq!(first.expose_secret(), "tok-1");
        assert_eq!(second.expose_secret(), "tok-2");
        assert_eq!(exchange.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exchange_failure_surfaces_after_retries() {
        let exchange = CountingExchange::failing();
        let (clock, _) = manual_clock(start_time());
        let cache = TokenCache::with_clock(exchange.clone(), fast_policy(), clock);

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, GigaChatError::Config(_)));
        assert_eq!(exchange.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_slot_empty() {
        let exchange = CountingExchange::failing();
        let (clock, _) = manual_clock(start_time());
        let cache = TokenCache::with_clock(exchange.clone(), fast_policy(), clock);

        assert!(cache.get().await.is_err());
        assert!(cache.get().await.is_err());
        // Each get runs a full retry cycle; no partial state is kept.
        assert_eq!(exchange.calls.load(Ordering::SeqCst), 6);
    }
}
