// In-memory credential store using DashMap
use crate::domain::error::TranslateError;
use crate::domain::model::ProviderCredentials;
use crate::domain::traits::CredentialStore;
use crate::infrastructure::config::Config;
use async_trait::async_trait;
use dashmap::DashMap;

/// Thread-safe in-memory credential store.
///
/// Used when no durable storage is wanted (embedding, tests).
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: DashMap<String, ProviderCredentials>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    /// Seed from the `[providers.*]` tables of a config.
    pub fn from_config(config: &Config) -> Self {
        let store = Self::new();
        for (id, creds) in &config.providers {
            store.map.insert(normalize(id), creds.clone());
        }
        store
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn normalize(provider_id: &str) -> String {
    provider_id.trim().to_ascii_lowercase()
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self, provider_id: &str) -> Result<Option<ProviderCredentials>, TranslateError> {
        Ok(self
            .map
            .get(&normalize(provider_id))
            .map(|entry| entry.value().clone()))
    }

    async fn save(
        &self,
        provider_id: &str,
        credentials: &ProviderCredentials,
    ) -> Result<(), TranslateError> {
        self.map.insert(normalize(provider_id), credentials.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_from_config() {
        let mut config = Config::default();
        config.providers.insert(
            "Qwen".to_string(),
            ProviderCredentials::new("sk-q", "", "qwen-plus"),
        );
        let store = MemoryStore::from_config(&config);
        assert_eq!(store.len(), 1);

        let creds = store.load("qwen").await.unwrap().unwrap();
        assert_eq!(creds.model_endpoint, "qwen-plus");
        assert!(store.load("kimi").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_previous_value() {
        let store = MemoryStore::new();
        store.save("kimi", &ProviderCredentials::new("a", "", "")).await.unwrap();
        store.save("KIMI", &ProviderCredentials::new("b", "", "")).await.unwrap();
        assert_eq!(store.load("kimi").await.unwrap().unwrap().api_key, "b");
        assert_eq!(store.len(), 1);
    }
}
