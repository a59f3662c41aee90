//! HTTP client implementation for the GigaChat API.
//!
//! This module provides a reqwest-based implementation of the
//! [`GigaChatApi`](crate::GigaChatApi) trait: the OAuth credential exchange
//! and the chat-completion call.

use crate::config::GigaChatConfig;
use crate::{ChatMessage, ChatRequest, ChatResponse, GigaChatApi, GigaChatError, TokenResponse};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use uuid::Uuid;

/// Fixed timeout for both the exchange and the completion call.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for the GigaChat API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestGigaChatClient {
    auth_url: String,
    base_url: String,
    client_id: String,
    client_secret: SecretString,
    scope: String,
    model: String,
    temperature: f64,
    client: reqwest::Client,
}

impl ReqwestGigaChatClient {
    /// Create a new client instance from configuration.
    ///
    /// The underlying reqwest client carries a fixed 60s request timeout;
    /// `insecure_tls` disables certificate verification for deployments
    /// fronted by a CA absent from standard root stores.
    pub fn new(config: GigaChatConfig) -> Self {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));
        if config.insecure_tls {
            tracing::warn!("TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().expect("reqwest client build should not fail");
        Self {
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id,
            client_secret: config.client_secret,
            scope: config.scope,
            model: config.model,
            temperature: config.temperature,
            client,
        }
    }

    /// `Basic` credentials for the exchange request.
    fn basic_credentials(&self) -> String {
        let raw = format!(
            "{}:{}",
            self.client_id,
            self.client_secret.expose_secret()
        );
        STANDARD.encode(raw)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> GigaChatError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            401 | 403 => GigaChatError::Auth(body_snippet),
            _ => GigaChatError::from_status(status, body_snippet),
        }
    }
}

#[async_trait]
impl GigaChatApi for ReqwestGigaChatClient {
    async fn exchange_token(&self) -> Result<TokenResponse, GigaChatError> {
        let rq_uid = Uuid::new_v4().to_string();
        tracing::debug!("requesting access token, RqUID {}", rq_uid);

        let resp = self
            .client
            .post(&self.auth_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", self.basic_credentials()),
            )
            .header("RqUID", rq_uid)
            .form(&[
                ("scope", self.scope.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json::<TokenResponse>().await?)
    }

    async fn complete(
        &self,
        token: &SecretString,
        prompt: &str,
    ) -> Result<String, GigaChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.temperature,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }

        // Read body as text first so a shape mismatch yields a helpful
        // error message instead of a bare decode failure.
        let text = resp.text().await?;
        let payload = serde_json::from_str::<ChatResponse>(&text).map_err(|e| {
            let body_snippet: String = text.chars().take(256).collect();
            GigaChatError::MalformedResponse(format!(
                "decoding completion: {} - body: {}",
                e, body_snippet
            ))
        })?;
        payload.into_text()
    }
}
