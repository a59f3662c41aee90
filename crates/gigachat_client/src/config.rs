use crate::GigaChatError;
use secrecy::SecretString;

pub const DEFAULT_AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
pub const DEFAULT_BASE_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1";
pub const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";
pub const DEFAULT_MODEL: &str = "GigaChat";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

#[derive(Clone, Debug)]
pub struct GigaChatConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Full URL of the OAuth endpoint; the credential service lives on a
    /// different host:port than the completion API.
    pub auth_url: String,
    pub base_url: String,
    pub scope: String,
    pub model: String,
    pub temperature: f64,
    /// Accept invalid TLS certificates. Needed when the deployment sits
    /// behind a CA that is absent from standard root stores.
    pub insecure_tls: bool,
}

impl GigaChatConfig {
    pub fn from_env() -> Result<Self, GigaChatError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, GigaChatError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let client_id = get("GIGACHAT_CLIENT_ID")
            .ok_or_else(|| GigaChatError::Config("GIGACHAT_CLIENT_ID missing".into()))?;
        let client_secret = get("GIGACHAT_CLIENT_SECRET")
            .ok_or_else(|| GigaChatError::Config("GIGACHAT_CLIENT_SECRET missing".into()))?;
        let auth_url = get("GIGACHAT_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.into());
        let base_url = get("GIGACHAT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let scope = get("GIGACHAT_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.into());
        let model = get("GIGACHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let insecure_tls = get("GIGACHAT_INSECURE_TLS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Ok(Self {
            client_id,
            client_secret: SecretString::new(client_secret.into()),
            auth_url,
            base_url,
            scope,
            model,
            temperature: DEFAULT_TEMPERATURE,
            insecure_tls,
        })
    }
}
