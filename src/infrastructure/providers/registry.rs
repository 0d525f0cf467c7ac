//! Supported providers and their defaults.
//!
//! Adding a vendor means appending a [`ProviderConfig`] here; a new
//! [`ProviderKind`] is only needed when its wire shape is new.

use crate::domain::model::{ProviderConfig, ProviderKind};

pub static PROVIDERS: &[ProviderConfig] = &[
    ProviderConfig {
        id: "kimi",
        display_name: "Kimi",
        default_base_url: "https://api.moonshot.cn/v1",
        default_model_endpoint: "moonshot-v1-8k",
        kind: ProviderKind::Standard,
    },
    ProviderConfig {
        id: "deepseek",
        display_name: "DeepSeek",
        default_base_url: "https://api.deepseek.com/v1",
        default_model_endpoint: "deepseek-chat",
        kind: ProviderKind::Standard,
    },
    ProviderConfig {
        id: "qwen",
        display_name: "Qwen",
        default_base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1",
        default_model_endpoint: "qwen-turbo",
        kind: ProviderKind::DashScope,
    },
    // Endpoint ids (ep-...) are issued per account, so there is no usable default.
    ProviderConfig {
        id: "doubao",
        display_name: "Doubao",
        default_base_url: "https://ark.cn-beijing.volces.com/api/v3",
        default_model_endpoint: "",
        kind: ProviderKind::QueryParam,
    },
];

/// Find a provider by id, ignoring ASCII case.
pub fn lookup(id: &str) -> Option<&'static ProviderConfig> {
    let id = id.trim();
    PROVIDERS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

pub fn ids() -> impl Iterator<Item = &'static str> {
    PROVIDERS.iter().map(|p| p.id)
}
