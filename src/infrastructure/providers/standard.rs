use super::{ChatRequest, ChatResponse};
use crate::domain::error::TranslateError;
use crate::domain::model::ChatCall;
use crate::domain::traits::ProviderAdapter;

/// OpenAI-compatible vendors (Moonshot/Kimi, DeepSeek).
#[derive(Debug, Default)]
pub struct StandardChat;

impl ProviderAdapter for StandardChat {
    fn build_body(&self, call: &ChatCall<'_>) -> Result<serde_json::Value, TranslateError> {
        Ok(serde_json::to_value(ChatRequest::from_call(call))?)
    }

    fn parse_response(&self, body: &str) -> Result<String, TranslateError> {
        ChatResponse::parse(body)?
            .choice_content()
            .ok_or_else(|| TranslateError::Format("missing choices[0].message.content".to_string()))
    }
}
