use crate::domain::error::TranslateError;
use crate::domain::model::{
    ChatCall, ProviderConfig, ProviderCredentials, TranslationRequest, TranslationResult,
    AUTO_DETECTED_MARKER,
};
use crate::domain::prompt::{build_prompt, PING_PROMPT};
use crate::domain::stats::TextStats;
use crate::domain::traits::{Sleeper, Transport};
use crate::infrastructure::network::retry::{retry_rate_limited, RetryPolicy};
use crate::infrastructure::providers::{adapter_for, registry};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Performs translation and rewrite calls against the configured providers.
///
/// Holds no per-call state: credentials travel inside each request.
#[derive(Clone)]
pub struct TranslationAdapter {
    transport: Arc<dyn Transport>,
}

impl TranslationAdapter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// One translation (or rewrite) round trip, no retries.
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslateError> {
        let started = Instant::now();

        if request.text.trim().is_empty() {
            return Err(TranslateError::InvalidRequest(
                "text to translate is empty".to_string(),
            ));
        }
        let provider = lookup_provider(&request.provider_id)?;
        validate_credentials(provider, &request.credentials)?;

        let prompt = build_prompt(request);
        let call = ChatCall {
            model: &request.credentials.model_endpoint,
            prompt,
            auto_detect: request.is_auto_detect(),
            max_tokens: None,
        };
        let translated_text = self.complete(provider, &request.credentials, &call).await?;

        let elapsed = round_to_hundredths(started.elapsed().as_secs_f64());
        let mut result = TranslationResult::new(translated_text, TextStats::from_text(&request.text), elapsed);
        result.detected_language = Some(if request.is_auto_detect() {
            AUTO_DETECTED_MARKER.to_string()
        } else {
            request.source_lang.clone()
        });

        info!(
            provider = provider.id,
            task = request.task.as_str(),
            elapsed_seconds = result.elapsed_seconds,
            characters = result.character_count,
            "translation finished"
        );
        Ok(result)
    }

    /// [`translate`](Self::translate) with exponential backoff on HTTP 429.
    pub async fn translate_with_retry(
        &self,
        request: &TranslationRequest,
        policy: &RetryPolicy,
        sleeper: &dyn Sleeper,
    ) -> Result<TranslationResult, TranslateError> {
        retry_rate_limited(policy, sleeper, || self.translate(request)).await
    }

    /// Probe a provider with a one-token request to check the credentials.
    pub async fn test_connection(
        &self,
        provider_id: &str,
        credentials: &ProviderCredentials,
    ) -> Result<(), TranslateError> {
        let provider = lookup_provider(provider_id)?;
        validate_credentials(provider, credentials)?;

        let call = ChatCall {
            model: &credentials.model_endpoint,
            prompt: PING_PROMPT.to_string(),
            auto_detect: false,
            max_tokens: Some(1),
        };
        debug!(provider = provider.id, "testing provider connection");
        self.post_chat(provider, credentials, &call).await?;
        Ok(())
    }

    async fn complete(
        &self,
        provider: &ProviderConfig,
        credentials: &ProviderCredentials,
        call: &ChatCall<'_>,
    ) -> Result<String, TranslateError> {
        let body = self.post_chat(provider, credentials, call).await?;
        adapter_for(provider.kind).parse_response(&body)
    }

    // Send one chat call; returns the body of a success response.
    async fn post_chat(
        &self,
        provider: &ProviderConfig,
        credentials: &ProviderCredentials,
        call: &ChatCall<'_>,
    ) -> Result<String, TranslateError> {
        let adapter = adapter_for(provider.kind);
        let url = adapter.build_url(credentials)?;
        let headers = adapter.build_headers(credentials);
        let body = adapter.build_body(call)?;

        debug!(provider = provider.id, %url, model = call.model, "sending chat completion request");
        let response = self.transport.post_json(url.as_str(), &headers, &body).await?;

        if !response.is_success() {
            debug!(provider = provider.id, status = response.status, "provider returned error status");
            return Err(TranslateError::Api {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
            });
        }
        Ok(response.body)
    }
}

fn lookup_provider(id: &str) -> Result<&'static ProviderConfig, TranslateError> {
    registry::lookup(id).ok_or_else(|| TranslateError::UnknownProvider(id.to_string()))
}

fn validate_credentials(
    provider: &ProviderConfig,
    credentials: &ProviderCredentials,
) -> Result<(), TranslateError> {
    if credentials.base_url.trim().is_empty() {
        return Err(TranslateError::Config(format!(
            "{} base URL not configured",
            provider.display_name
        )));
    }
    if credentials.model_endpoint.trim().is_empty() {
        return Err(TranslateError::Config(format!(
            "{} model endpoint not configured",
            provider.display_name
        )));
    }
    Ok(())
}

fn round_to_hundredths(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_elapsed_to_two_decimals() {
        assert_eq!(round_to_hundredths(1.23456), 1.23);
        assert_eq!(round_to_hundredths(2.999), 3.0);
        assert_eq!(round_to_hundredths(0.0), 0.0);
    }

    #[test]
    fn blank_credentials_are_rejected() {
        let provider = registry::lookup("kimi").unwrap();
        let err = validate_credentials(provider, &ProviderCredentials::new("k", " ", "m")).unwrap_err();
        assert!(err.to_string().contains("base URL"));
        let err = validate_credentials(provider, &ProviderCredentials::new("k", "https://x", "")).unwrap_err();
        assert!(err.to_string().contains("model endpoint"));
        assert!(validate_credentials(provider, &ProviderCredentials::new("", "https://x", "m")).is_ok());
    }
}
