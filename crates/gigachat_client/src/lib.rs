//! `GigaChatApi` trait, wire types and reqwest-based implementation.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod retry;
pub mod token;

#[derive(Debug, Error)]
pub enum GigaChatError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },
}

impl GigaChatError {
    pub fn from_status(status: u16, body: String) -> Self {
        GigaChatError::Api { status, body }
    }
}

/// Response of the OAuth credential exchange. `expires_in` is a TTL in
/// seconds, relative to the moment the exchange completed.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Generated text lives at `choices[0].message.content`; anything else
    /// is a malformed response.
    pub fn into_text(self) -> Result<String, GigaChatError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GigaChatError::MalformedResponse("empty choices array".into()))
    }
}

#[async_trait]
pub trait GigaChatApi: Send + Sync + 'static {
    /// Exchange client credentials for a fresh bearer token.
    async fn exchange_token(&self) -> Result<TokenResponse, GigaChatError>;

    /// Issue a single chat-completion call and return the generated text.
    ///
    /// A 401 response maps to [`GigaChatError::Auth`] so callers can
    /// invalidate a cached token before falling back.
    async fn complete(&self, token: &SecretString, prompt: &str)
    -> Result<String, GigaChatError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_response_parses_access_token_and_ttl() {
        let payload = json!({"access_token": "abc", "expires_in": 1800});
        let resp: TokenResponse = serde_json::from_value(payload).expect("token response");
        assert_eq!(resp.access_token, "abc");
        assert_eq!(resp.expires_in, 1800);
    }

    #[test]
    fn chat_request_serializes_expected_fields() {
        let req = ChatRequest {
            model: "GigaChat".into(),
            messages: vec![ChatMessage::user("hello")],
            temperature: 0.7,
        };
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(value["model"], "GigaChat");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hello");
        assert_eq!(value["temperature"], 0.7);
    }

    #[test]
    fn chat_response_text_is_first_choice_content() {
        let payload = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "menu text"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        let resp: ChatResponse = serde_json::from_value(payload).expect("chat response");
        assert_eq!(resp.into_text().unwrap(), "menu text");
    }

    #[test]
    fn chat_response_without_choices_is_malformed() {
        let payload = json!({"choices": []});
        let resp: ChatResponse = serde_json::from_value(payload).expect("chat response");
        let err = resp.into_text().unwrap_err();
        assert!(matches!(err, GigaChatError::MalformedResponse(_)));
    }
}
