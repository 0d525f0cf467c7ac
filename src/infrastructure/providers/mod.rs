// Provider adapters and the static registry that selects them
pub mod dashscope;
pub mod query_param;
pub mod registry;
pub mod standard;

use crate::domain::error::TranslateError;
use crate::domain::model::{ChatCall, ProviderKind};
use crate::domain::traits::ProviderAdapter;
use serde::{Deserialize, Serialize};

static STANDARD: standard::StandardChat = standard::StandardChat;
static DASHSCOPE: dashscope::DashScope = dashscope::DashScope;
static QUERY_PARAM: query_param::QueryParamChat = query_param::QueryParamChat;

/// Resolve the adapter implementing a provider kind.
pub fn adapter_for(kind: ProviderKind) -> &'static dyn ProviderAdapter {
    match kind {
        ProviderKind::Standard => &STANDARD,
        ProviderKind::DashScope => &DASHSCOPE,
        ProviderKind::QueryParam => &QUERY_PARAM,
    }
}

// Chat-completion request shared by every vendor
#[derive(Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize, Clone)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub fn from_call(call: &'a ChatCall<'a>) -> Self {
        Self {
            model: call.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &call.prompt,
            }],
            max_tokens: call.max_tokens,
        }
    }
}

// Response fields are all optional: vendors disagree on which ones they fill
#[derive(Deserialize, Debug, Default)]
pub(crate) struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    output: Option<VendorOutput>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize, Debug)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct VendorOutput {
    text: Option<String>,
}

impl ChatResponse {
    pub fn parse(body: &str) -> Result<Self, TranslateError> {
        serde_json::from_str(body)
            .map_err(|e| TranslateError::Format(format!("response is not valid JSON: {e}")))
    }

    /// `choices[0].message.content`
    pub fn choice_content(&self) -> Option<String> {
        self.choices
            .as_ref()?
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
    }

    /// `output.text`
    pub fn output_text(&self) -> Option<String> {
        self.output
            .as_ref()?
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
    }
}
