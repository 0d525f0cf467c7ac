use crate::domain::error::TranslateError;
use crate::domain::model::{
    HistoryEntry, ProviderConfig, ProviderCredentials, Task, TranslationRequest, TranslationResult,
};
use crate::infrastructure::providers::registry;
use crate::infrastructure::sync::{BitableSync, SyncRecord};
use crate::state::AppState;
use tracing::warn;

/// Text picked by the user plus optional per-call overrides of the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    pub task: Task,
    pub provider_id: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
}

impl Selection {
    pub fn translate(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            task: Task::Translate,
            provider_id: None,
            source_lang: None,
            target_lang: None,
        }
    }

    pub fn rewrite(text: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            task: Task::Rewrite {
                instruction: instruction.into(),
            },
            ..Self::translate(text)
        }
    }

    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    pub fn with_languages(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_lang = Some(source.into());
        self.target_lang = Some(target.into());
        self
    }
}

/// Translate or rewrite a selection with the configured provider.
///
/// Credentials are loaded fresh for every call; 429 responses are retried
/// according to `[retry]`; the result is recorded to history when enabled.
pub async fn translate_selection(
    state: &AppState,
    selection: Selection,
) -> Result<TranslationResult, TranslateError> {
    if selection.text.trim().is_empty() {
        return Err(TranslateError::InvalidRequest(
            "no text selected".to_string(),
        ));
    }
    if let Task::Rewrite { instruction } = &selection.task {
        if instruction.trim().is_empty() {
            return Err(TranslateError::InvalidRequest(
                "rewrite instruction is empty".to_string(),
            ));
        }
    }

    let request = build_request(state, selection).await?;
    let policy = state.config.retry.policy();
    let result = state
        .adapter
        .translate_with_retry(&request, &policy, state.sleeper.as_ref())
        .await?;

    if state.config.record_history {
        if let Some(history) = &state.history {
            // History is best effort; the caller still gets the translation.
            if let Err(e) = history
                .record_history(&HistoryEntry::from_result(&request, &result))
                .await
            {
                warn!("Failed to record translation history: {}", e);
            }
        }
    }

    Ok(result)
}

/// Check that stored credentials for a provider are accepted.
pub async fn test_provider(state: &AppState, provider_id: &str) -> Result<(), TranslateError> {
    let provider = find_provider(provider_id)?;
    let credentials = resolve_credentials(state, provider).await?;
    state.adapter.test_connection(provider.id, &credentials).await
}

/// Validate and persist credentials for a provider.
pub async fn save_credentials(
    state: &AppState,
    provider_id: &str,
    credentials: ProviderCredentials,
) -> Result<(), TranslateError> {
    let provider = find_provider(provider_id)?;
    let credentials = ProviderCredentials::new(
        credentials.api_key.trim(),
        credentials.base_url.trim(),
        credentials.model_endpoint.trim(),
    );
    if credentials.api_key.is_empty() {
        return Err(TranslateError::Config(format!(
            "{} API key is empty",
            provider.display_name
        )));
    }
    state.credentials.save(provider.id, &credentials).await
}

/// Append a finished result to the configured Bitable table.
pub async fn sync_result(
    state: &AppState,
    record: &SyncRecord,
) -> Result<(), TranslateError> {
    if !state.config.sync.enable {
        return Err(TranslateError::Config("result sync is disabled".to_string()));
    }
    let sync = BitableSync::new(state.http_client.clone(), &state.config.sync)?;
    sync.push(record).await
}

async fn build_request(
    state: &AppState,
    selection: Selection,
) -> Result<TranslationRequest, TranslateError> {
    let config = &state.config;
    let provider_id = selection
        .provider_id
        .unwrap_or_else(|| config.default_provider.clone());
    let provider = find_provider(&provider_id)?;
    let credentials = resolve_credentials(state, provider).await?;

    Ok(TranslationRequest {
        text: selection.text,
        source_lang: selection
            .source_lang
            .unwrap_or_else(|| config.source_lang.clone()),
        target_lang: selection
            .target_lang
            .unwrap_or_else(|| config.target_lang.clone()),
        provider_id: provider.id.to_string(),
        credentials,
        task: selection.task,
    })
}

fn find_provider(id: &str) -> Result<&'static ProviderConfig, TranslateError> {
    registry::lookup(id).ok_or_else(|| TranslateError::UnknownProvider(id.to_string()))
}

// Store first, then the config seed, then registry defaults for blank fields.
async fn resolve_credentials(
    state: &AppState,
    provider: &ProviderConfig,
) -> Result<ProviderCredentials, TranslateError> {
    let stored = match state.credentials.load(provider.id).await? {
        Some(creds) => creds,
        None => state
            .config
            .provider_credentials(provider.id)
            .cloned()
            .unwrap_or_default(),
    };
    Ok(stored.or_defaults(provider))
}
