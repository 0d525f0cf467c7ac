use serde::{Deserialize, Serialize};

use crate::domain::stats::TextStats;

/// Source language value that asks the provider to detect the language itself.
pub const AUTO_LANG: &str = "auto";

/// Placeholder reported as the detected language for `auto` requests.
/// No provider returns a real detection result, so this is only a marker.
pub const AUTO_DETECTED_MARKER: &str = "auto-detected";

// 供应商的请求/响应形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Plain OpenAI-style chat completions.
    Standard,
    /// Alibaba DashScope: extra header, mirrored `input` block, `output.text` fallback.
    DashScope,
    /// Model endpoint passed as a `model_endpoint` query parameter.
    QueryParam,
}

/// Static description of a supported vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub id: &'static str,
    pub display_name: &'static str,
    pub default_base_url: &'static str,
    pub default_model_endpoint: &'static str,
    pub kind: ProviderKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub model_endpoint: String,
}

impl ProviderCredentials {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model_endpoint: model_endpoint.into(),
        }
    }

    /// Fill blank base URL / model endpoint from the provider's defaults.
    pub fn or_defaults(mut self, provider: &ProviderConfig) -> Self {
        if self.base_url.trim().is_empty() {
            self.base_url = provider.default_base_url.to_string();
        }
        if self.model_endpoint.trim().is_empty() {
            self.model_endpoint = provider.default_model_endpoint.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    Translate,
    Rewrite { instruction: String },
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Translate => "translate",
            Task::Rewrite { .. } => "rewrite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub provider_id: String,
    pub credentials: ProviderCredentials,
    pub task: Task,
}

impl TranslationRequest {
    pub fn translate(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        provider_id: impl Into<String>,
        credentials: ProviderCredentials,
    ) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            provider_id: provider_id.into(),
            credentials,
            task: Task::Translate,
        }
    }

    pub fn rewrite(
        text: impl Into<String>,
        instruction: impl Into<String>,
        provider_id: impl Into<String>,
        credentials: ProviderCredentials,
    ) -> Self {
        Self {
            text: text.into(),
            source_lang: AUTO_LANG.to_string(),
            target_lang: String::new(),
            provider_id: provider_id.into(),
            credentials,
            task: Task::Rewrite {
                instruction: instruction.into(),
            },
        }
    }

    pub fn is_auto_detect(&self) -> bool {
        self.source_lang.eq_ignore_ascii_case(AUTO_LANG)
    }
}

// 单次调用的结果，不做持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translated_text: String,
    pub elapsed_seconds: f64,
    pub character_count: usize,
    pub word_count: usize,
    pub paragraph_count: usize,
    pub line_count: usize,
    pub detected_language: Option<String>,
}

impl TranslationResult {
    pub fn new(translated_text: String, stats: TextStats, elapsed_seconds: f64) -> Self {
        Self {
            translated_text,
            elapsed_seconds,
            character_count: stats.characters,
            word_count: stats.words,
            paragraph_count: stats.paragraphs,
            line_count: stats.lines,
            detected_language: None,
        }
    }
}

/// Everything a provider adapter needs to shape one chat-completion body.
#[derive(Debug, Clone)]
pub struct ChatCall<'a> {
    pub model: &'a str,
    pub prompt: String,
    pub auto_detect: bool,
    pub max_tokens: Option<u32>,
}

/// Transport-neutral view of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A finished translation or rewrite as kept in the local history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub provider_id: String,
    pub task: String,
    pub source_lang: String,
    pub target_lang: String,
    pub original_text: String,
    pub result_text: String,
    pub elapsed_seconds: f64,
    pub created_at: i64,
}

impl HistoryEntry {
    pub fn from_result(request: &TranslationRequest, result: &TranslationResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            provider_id: request.provider_id.clone(),
            task: request.task.as_str().to_string(),
            source_lang: request.source_lang.clone(),
            target_lang: request.target_lang.clone(),
            original_text: request.text.clone(),
            result_text: result.translated_text.clone(),
            elapsed_seconds: result.elapsed_seconds,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}
