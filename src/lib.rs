//! Translate or rewrite selected text through several LLM chat-completion
//! providers (Kimi, DeepSeek, Qwen, Doubao).
//!
//! The core is [`TranslationAdapter`]: it shapes the request for the chosen
//! provider, normalizes the response and retries HTTP 429 with exponential
//! backoff. [`application::translate`] wires it to configuration, credential
//! storage and history for the extension's message handlers.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod state;

pub use application::translate::{translate_selection, Selection};
pub use domain::error::TranslateError;
pub use domain::model::{
    ProviderConfig, ProviderCredentials, ProviderKind, Task, TranslationRequest,
    TranslationResult,
};
pub use infrastructure::config::{load_config, Config};
pub use infrastructure::network::client::TranslationAdapter;
pub use infrastructure::network::retry::RetryPolicy;
pub use infrastructure::providers::registry;
pub use state::AppState;
