//! Push finished translations into a Feishu (Lark) Bitable table.
//!
//! Each sync fetches a fresh tenant access token, then appends one row.
//! Column names match the table layout the extension users create.

use crate::domain::error::TranslateError;
use crate::domain::model::{Task, TranslationRequest, TranslationResult};
use crate::infrastructure::config::SyncConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

const DEFAULT_API_BASE: &str = "https://open.feishu.cn";

// 多维表格列名
const COL_ORIGINAL: &str = "原文";
const COL_RESULT: &str = "翻译结果";
const COL_SOURCE_LANG: &str = "源语言";
const COL_TARGET_LANG: &str = "目标语言";
const COL_OPERATION: &str = "操作类型";
const COL_SYNC_TIME: &str = "同步时间";
const COL_MODIFIED_TIME: &str = "最后修改时间";
const COL_CREATED_TIME: &str = "创建时间";
const COL_URL: &str = "URL";
const COL_TITLE: &str = "标题";
const COL_PROVIDER: &str = "大模型";

/// One row to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub original_text: String,
    pub result_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub operation: String,
    pub page_url: String,
    pub page_title: String,
    pub provider: String,
}

impl SyncRecord {
    pub fn from_result(
        request: &TranslationRequest,
        result: &TranslationResult,
        page_url: impl Into<String>,
        page_title: impl Into<String>,
    ) -> Self {
        let operation = match request.task {
            Task::Translate => "翻译",
            Task::Rewrite { .. } => "改写",
        };
        Self {
            original_text: request.text.clone(),
            result_text: result.translated_text.clone(),
            source_lang: request.source_lang.clone(),
            target_lang: request.target_lang.clone(),
            operation: operation.to_string(),
            page_url: page_url.into(),
            page_title: page_title.into(),
            provider: request.provider_id.clone(),
        }
    }

    fn to_fields(&self, timestamp: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        let mut put = |name: &str, value: &str| {
            fields.insert(name.to_string(), Value::String(value.to_string()));
        };
        put(COL_ORIGINAL, &self.original_text);
        put(COL_RESULT, &self.result_text);
        put(COL_SOURCE_LANG, &self.source_lang);
        put(COL_TARGET_LANG, &self.target_lang);
        put(COL_OPERATION, &self.operation);
        put(COL_SYNC_TIME, timestamp);
        put(COL_MODIFIED_TIME, timestamp);
        put(COL_CREATED_TIME, timestamp);
        put(COL_URL, &self.page_url);
        put(COL_TITLE, &self.page_title);
        put(COL_PROVIDER, &self.provider);
        fields
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    tenant_access_token: Option<String>,
}

#[derive(Serialize)]
struct BatchCreateRequest {
    records: Vec<RecordFields>,
}

#[derive(Serialize)]
struct RecordFields {
    fields: Map<String, Value>,
}

#[derive(Deserialize, Debug)]
struct ApiEnvelope {
    code: i64,
    #[serde(default)]
    msg: String,
}

/// Validated sync settings.
#[derive(Debug, Clone)]
struct BitableTarget {
    app_id: String,
    app_secret: String,
    bitable_token: String,
    table_id: String,
    api_base: String,
}

impl BitableTarget {
    fn from_config(config: &SyncConfig) -> Result<Self, TranslateError> {
        fn required(value: &Option<String>, name: &str) -> Result<String, TranslateError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .ok_or_else(|| TranslateError::Config(format!("Feishu sync: {name} not configured")))
        }

        Ok(Self {
            app_id: required(&config.app_id, "app_id")?,
            app_secret: required(&config.app_secret, "app_secret")?,
            bitable_token: required(&config.bitable_token, "bitable_token")?,
            table_id: required(&config.table_id, "table_id")?,
            api_base: config
                .api_base
                .as_deref()
                .filter(|b| !b.is_empty())
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

pub struct BitableSync {
    client: Client,
    target: BitableTarget,
}

impl BitableSync {
    /// Fails before any I/O when the sync settings are incomplete.
    pub fn new(client: Client, config: &SyncConfig) -> Result<Self, TranslateError> {
        Ok(Self {
            client,
            target: BitableTarget::from_config(config)?,
        })
    }

    pub async fn push(&self, record: &SyncRecord) -> Result<(), TranslateError> {
        let token = self.tenant_access_token().await?;
        let timestamp = chrono::Utc::now().to_rfc3339();

        let url = format!(
            "{}/open-apis/bitable/v1/apps/{}/tables/{}/records/batch_create",
            self.target.api_base, self.target.bitable_token, self.target.table_id
        );
        let body = BatchCreateRequest {
            records: vec![RecordFields {
                fields: record.to_fields(&timestamp),
            }],
        };

        debug!(table = %self.target.table_id, "appending bitable record");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        let envelope: ApiEnvelope = read_json(response).await?;
        if envelope.code != 0 {
            return Err(TranslateError::Sync(format!(
                "Feishu bitable error {}: {}",
                envelope.code, envelope.msg
            )));
        }

        info!(table = %self.target.table_id, "synced translation to bitable");
        Ok(())
    }

    async fn tenant_access_token(&self) -> Result<String, TranslateError> {
        let url = format!(
            "{}/open-apis/auth/v3/tenant_access_token/internal",
            self.target.api_base
        );
        let response = self
            .client
            .post(&url)
            .json(&TokenRequest {
                app_id: &self.target.app_id,
                app_secret: &self.target.app_secret,
            })
            .send()
            .await?;

        let token: TokenResponse = read_json(response).await?;
        if token.code != 0 {
            return Err(TranslateError::Sync(format!(
                "Feishu token error {}: {}",
                token.code, token.msg
            )));
        }
        token
            .tenant_access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TranslateError::Sync("Feishu token response has no token".to_string()))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TranslateError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(TranslateError::Api {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body: text,
        });
    }
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> SyncConfig {
        SyncConfig {
            enable: true,
            app_id: Some("cli_a".to_string()),
            app_secret: Some("secret".to_string()),
            bitable_token: Some("bascn123".to_string()),
            table_id: Some("tbl1".to_string()),
            api_base: Some("http://127.0.0.1:9/".to_string()),
        }
    }

    #[test]
    fn incomplete_config_is_rejected() {
        let mut config = full_config();
        config.table_id = Some("  ".to_string());
        let err = BitableTarget::from_config(&config).unwrap_err();
        assert!(matches!(err, TranslateError::Config(ref m) if m.contains("table_id")));
    }

    #[test]
    fn api_base_defaults_and_trims() {
        let target = BitableTarget::from_config(&full_config()).unwrap();
        assert_eq!(target.api_base, "http://127.0.0.1:9");

        let mut config = full_config();
        config.api_base = None;
        let target = BitableTarget::from_config(&config).unwrap();
        assert_eq!(target.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn fields_use_table_columns() {
        let record = SyncRecord {
            original_text: "你好".to_string(),
            result_text: "Hello".to_string(),
            source_lang: "auto".to_string(),
            target_lang: "en".to_string(),
            operation: "翻译".to_string(),
            page_url: "https://example.com".to_string(),
            page_title: "Example".to_string(),
            provider: "kimi".to_string(),
        };
        let fields = record.to_fields("2026-01-01T00:00:00Z");
        assert_eq!(fields[COL_ORIGINAL], "你好");
        assert_eq!(fields[COL_RESULT], "Hello");
        assert_eq!(fields[COL_SYNC_TIME], "2026-01-01T00:00:00Z");
        assert_eq!(fields.len(), 11);
    }

    #[test]
    fn operation_label_follows_task() {
        use crate::domain::model::ProviderCredentials;
        use crate::domain::stats::TextStats;

        let result = TranslationResult::new("out".to_string(), TextStats::default(), 0.1);
        let rewrite = TranslationRequest::rewrite("in", "Polish:", "qwen", ProviderCredentials::default());
        let translate = TranslationRequest::translate("in", "auto", "en", "qwen", ProviderCredentials::default());

        assert_eq!(SyncRecord::from_result(&rewrite, &result, "", "").operation, "改写");
        assert_eq!(SyncRecord::from_result(&translate, &result, "", "").operation, "翻译");
    }
}
