//! Alibaba DashScope (Qwen).
//!
//! The compatible-mode endpoint accepts the standard chat payload, but the
//! native fields are sent alongside it: an `input.messages` mirror and a
//! `parameters` block. Responses may come back in either shape.

use super::{ChatMessage, ChatRequest, ChatResponse};
use crate::domain::error::TranslateError;
use crate::domain::model::{ChatCall, ProviderCredentials};
use crate::domain::traits::ProviderAdapter;
use serde::Serialize;

const SSE_HEADER: &str = "X-DashScope-SSE";

#[derive(Debug, Default)]
pub struct DashScope;

#[derive(Serialize)]
struct DashScopeRequest<'a> {
    #[serde(flatten)]
    chat: ChatRequest<'a>,
    input: DashScopeInput<'a>,
    parameters: DashScopeParameters,
}

#[derive(Serialize)]
struct DashScopeInput<'a> {
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct DashScopeParameters {
    result_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_detection: Option<bool>,
}

impl ProviderAdapter for DashScope {
    fn build_headers(&self, credentials: &ProviderCredentials) -> Vec<(String, String)> {
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                "Authorization".to_string(),
                format!("Bearer {}", credentials.api_key),
            ),
            // Streaming is never consumed.
            (SSE_HEADER.to_string(), "disable".to_string()),
        ]
    }

    fn build_body(&self, call: &ChatCall<'_>) -> Result<serde_json::Value, TranslateError> {
        let chat = ChatRequest::from_call(call);
        let input = DashScopeInput {
            messages: chat.messages.clone(),
        };
        let request = DashScopeRequest {
            chat,
            input,
            parameters: DashScopeParameters {
                result_format: "message",
                language_detection: call.auto_detect.then_some(true),
            },
        };
        Ok(serde_json::to_value(request)?)
    }

    fn parse_response(&self, body: &str) -> Result<String, TranslateError> {
        let response = ChatResponse::parse(body)?;
        response
            .choice_content()
            .or_else(|| response.output_text())
            .ok_or_else(|| {
                TranslateError::Format(
                    "Qwen response has neither choices[0].message.content nor output.text"
                        .to_string(),
                )
            })
    }
}
