//! Shared test utilities and mock `GigaChatApi` implementations used by unit tests.
//!
//! Keep this module `#[cfg(test)]`-only so mocks never ship in release builds.
#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use gigachat_client::{GigaChatApi, GigaChatError, TokenResponse};
use secrecy::SecretString;
use tokio::sync::Mutex;

/// Mock that always succeeds. Tokens are `tok-N`, completions return a
/// fixed body, and the last prompt is recorded for inspection.
pub struct StaticMenuClient {
    pub html: String,
    pub exchange_calls: AtomicU32,
    pub complete_calls: AtomicU32,
    pub last_prompt: Mutex<Option<String>>,
}

impl StaticMenuClient {
    pub fn new(html: &str) -> Arc<Self> {
        Arc::new(Self {
            html: html.to_string(),
            exchange_calls: AtomicU32::new(0),
            complete_calls: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        })
    }
}

#[async_trait]
impl GigaChatApi for StaticMenuClient {
    async fn exchange_token(&self) -> Result<TokenResponse, GigaChatError> {
        let n = self.exchange_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenResponse {
            access_token: format!("tok-{}", n),
            expires_in: 3600,
        })
    }

    async fn complete(
        &self,
        _token: &SecretString,
        prompt: &str,
    ) -> Result<String, GigaChatError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().await = Some(prompt.to_string());
        Ok(self.html.clone())
    }
}

/// Mock whose completions always fail with the supplied error. Token
/// exchange succeeds and counts calls so tests can observe cache behaviour.
pub struct FailingCompletionClient {
    pub err: fn() -> GigaChatError,
    pub exchange_calls: AtomicU32,
}

impl FailingCompletionClient {
    pub fn new(err: fn() -> GigaChatError) -> Arc<Self> {
        Arc::new(Self {
            err,
            exchange_calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl GigaChatApi for FailingCompletionClient {
    async fn exchange_token(&self) -> Result<TokenResponse, GigaChatError> {
        let n = self.exchange_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenResponse {
            access_token: format!("tok-{}", n),
            expires_in: 3600,
        })
    }

    async fn complete(
        &self,
        _token: &SecretString,
        _prompt: &str,
    ) -> Result<String, GigaChatError> {
        Err((self.err)())
    }
}

/// Mock whose token exchange is down. Completion must never be reached.
pub struct DownExchangeClient;

#[async_trait]
impl GigaChatApi for DownExchangeClient {
    async fn exchange_token(&self) -> Result<TokenResponse, GigaChatError> {
        Err(GigaChatError::Config("exchange down".to_string()))
    }

    async fn complete(
        &self,
        _token: &SecretString,
        _prompt: &str,
    ) -> Result<String, GigaChatError> {
        unimplemented!("completion is not expected when token exchange fails")
    }
}
