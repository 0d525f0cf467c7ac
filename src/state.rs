use crate::domain::error::TranslateError;
use crate::domain::traits::{CredentialStore, Sleeper, Transport};
use crate::infrastructure::config::Config;
use crate::infrastructure::network::client::TranslationAdapter;
use crate::infrastructure::network::http::{create_client, ReqwestTransport};
use crate::infrastructure::network::retry::TokioSleeper;
use crate::infrastructure::storage::db::SqliteStore;
use reqwest::Client;
use std::sync::Arc;

/// Everything a message handler needs, passed explicitly into each call.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub adapter: TranslationAdapter,
    pub credentials: Arc<dyn CredentialStore>,
    pub history: Option<SqliteStore>,
    pub sleeper: Arc<dyn Sleeper>,
    pub http_client: Client,
}

impl AppState {
    pub fn new(config: Config, credentials: Arc<dyn CredentialStore>) -> Result<Self, TranslateError> {
        let http_client = create_client(&config.http)?;
        let transport = Arc::new(ReqwestTransport::new(http_client.clone()));
        Ok(Self::with_parts(
            config,
            http_client,
            transport,
            credentials,
            Arc::new(TokioSleeper),
        ))
    }

    /// Assemble from explicit collaborators (custom transports, fake clocks).
    pub fn with_parts(
        config: Config,
        http_client: Client,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            adapter: TranslationAdapter::new(transport),
            credentials,
            history: None,
            sleeper,
            http_client,
        }
    }

    pub fn with_history(mut self, store: SqliteStore) -> Self {
        self.history = Some(store);
        self
    }
}
