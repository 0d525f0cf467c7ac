use crate::domain::error::TranslateError;
use crate::domain::model::{ChatCall, HttpResponse, ProviderCredentials};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// Wire shape of one provider family.
///
/// Default methods describe the plain OpenAI-style chat-completion call;
/// vendors override only the steps where their API differs.
pub trait ProviderAdapter: Send + Sync {
    fn build_headers(&self, credentials: &ProviderCredentials) -> Vec<(String, String)> {
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                "Authorization".to_string(),
                format!("Bearer {}", credentials.api_key),
            ),
        ]
    }

    fn build_url(&self, credentials: &ProviderCredentials) -> Result<Url, TranslateError> {
        chat_completions_url(&credentials.base_url)
    }

    fn build_body(&self, call: &ChatCall<'_>) -> Result<serde_json::Value, TranslateError>;

    /// Extract the completion text from a successful response body.
    fn parse_response(&self, body: &str) -> Result<String, TranslateError>;
}

/// `<base>/chat/completions`; a base URL that does not parse is a config error.
pub fn chat_completions_url(base_url: &str) -> Result<Url, TranslateError> {
    let raw = format!("{}/chat/completions", base_url.trim().trim_end_matches('/'));
    Url::parse(&raw)
        .map_err(|e| TranslateError::Config(format!("invalid base URL {base_url:?}: {e}")))
}

/// Sends one JSON POST and hands back the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TranslateError>;
}

/// Timed suspension used between retry attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Per-provider credential persistence.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self, provider_id: &str) -> Result<Option<ProviderCredentials>, TranslateError>;

    async fn save(
        &self,
        provider_id: &str,
        credentials: &ProviderCredentials,
    ) -> Result<(), TranslateError>;
}
