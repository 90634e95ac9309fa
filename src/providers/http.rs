use crate::config::{Config, ProviderConfig};
use crate::core::{Provider, ProviderError, ProviderResult};
use crate::providers::ResponseShape;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Builds the client the providers share. `timeout` bounds each whole
/// request, which suits small JSON answers.
pub fn build_client(config: &Config) -> Result<reqwest::Client> {
    let client = client_builder(config)
        .timeout(Duration::from_secs(config.timeout))
        .build()?;
    Ok(client)
}

/// Builds the client for media downloads. A transfer may run for minutes,
/// so `timeout` only bounds connecting and each gap between reads.
pub fn build_download_client(config: &Config) -> Result<reqwest::Client> {
    let timeout = Duration::from_secs(config.timeout);
    let client = client_builder(config)
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()?;
    Ok(client)
}

fn client_builder(config: &Config) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::limited(10))
}

/// A parse service reached with `GET <endpoint>?<param>=<share url>`.
pub struct HttpProvider {
    name: String,
    endpoint: String,
    param: String,
    shape: ResponseShape,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(config: &ProviderConfig, client: reqwest::Client) -> Self {
        Self {
            name: config.name.clone(),
            endpoint: config.endpoint.clone(),
            param: config.param.clone(),
            shape: config.shape,
            client,
        }
    }

    pub fn request_url(&self, url: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}={}",
            self.endpoint,
            separator,
            self.param,
            urlencoding::encode(url)
        )
    }
}

#[async_trait]
impl Provider for HttpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, url: &str) -> Result<Value, ProviderError> {
        let request_url = self.request_url(url);
        debug!("{} -> {}", self.name, request_url);

        let response = self
            .client
            .get(&request_url)
            .header("Accept", "application/json, text/plain, */*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        // Some services label JSON as text/html, so parse the body ourselves.
        let body = response.bytes().await?;
        let raw = serde_json::from_slice(&body)?;
        Ok(raw)
    }

    fn normalize(&self, raw: &Value) -> Result<ProviderResult, ProviderError> {
        self.shape.normalize(raw)
    }
}
