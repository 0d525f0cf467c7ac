use super::{ChatRequest, ChatResponse};
use crate::domain::error::TranslateError;
use crate::domain::model::{ChatCall, ProviderCredentials};
use crate::domain::traits::{chat_completions_url, ProviderAdapter};
use reqwest::Url;

/// Vendors that select the model through a `model_endpoint` query parameter
/// (Volcengine Ark / Doubao).
#[derive(Debug, Default)]
pub struct QueryParamChat;

impl ProviderAdapter for QueryParamChat {
    fn build_url(&self, credentials: &ProviderCredentials) -> Result<Url, TranslateError> {
        let mut url = chat_completions_url(&credentials.base_url)?;
        url.query_pairs_mut()
            .append_pair("model_endpoint", credentials.model_endpoint.trim());
        Ok(url)
    }

    fn build_body(&self, call: &ChatCall<'_>) -> Result<serde_json::Value, TranslateError> {
        Ok(serde_json::to_value(ChatRequest::from_call(call))?)
    }

    fn parse_response(&self, body: &str) -> Result<String, TranslateError> {
        let response = ChatResponse::parse(body)?;
        response
            .choice_content()
            .or_else(|| response.output_text())
            .ok_or_else(|| {
                TranslateError::Format(
                    "missing choices[0].message.content and output.text".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_endpoint_goes_into_query() {
        let creds = ProviderCredentials::new("k", "https://ark.cn-beijing.volces.com/api/v3/", "ep-20240101-abc");
        assert_eq!(
            QueryParamChat.build_url(&creds).unwrap().as_str(),
            "https://ark.cn-beijing.volces.com/api/v3/chat/completions?model_endpoint=ep-20240101-abc"
        );
    }

    #[test]
    fn model_endpoint_is_escaped() {
        let creds = ProviderCredentials::new("k", "https://ark.example.com/api/v3", "ep 1&x=2");
        let url = QueryParamChat.build_url(&creds).unwrap();
        assert_eq!(url.query(), Some("model_endpoint=ep+1%26x%3D2"));
        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "ep 1&x=2");
    }

    #[test]
    fn unparsable_base_url_is_config_error() {
        let creds = ProviderCredentials::new("k", "not a url", "ep-1");
        assert!(matches!(
            QueryParamChat.build_url(&creds),
            Err(TranslateError::Config(_))
        ));
    }

    #[test]
    fn falls_back_to_output_text() {
        assert_eq!(
            QueryParamChat
                .parse_response(r#"{"output":{"text":"  Y  "}}"#)
                .unwrap(),
            "Y"
        );
        assert!(QueryParamChat.parse_response("{}").is_err());
    }
}
