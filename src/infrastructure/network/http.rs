// HTTP client utilities
use crate::domain::error::TranslateError;
use crate::domain::model::HttpResponse;
use crate::domain::traits::Transport;
use crate::infrastructure::config::HttpConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Create the shared HTTP client from configuration.
pub fn create_client(config: &HttpConfig) -> Result<Client, TranslateError> {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str());

    if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }

    Ok(builder.build()?)
}

/// [`Transport`] backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TranslateError> {
        // Serialize by hand so the adapter's Content-Type is the only one sent.
        let mut req = self.client.post(url).body(serde_json::to_vec(body)?);
        for (name, value) in headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}
