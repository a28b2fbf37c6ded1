use crate::config::{ApiKey, FeedServiceConfig};
use crate::core::message::{FeedTarget, Reading};
use crate::processors::{ForwardOutcome, Forwarder};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::ClientBuilder;
use reqwest::header::{ACCEPT, HeaderName, HeaderValue};
use std::time::Duration;

/// Writes readings to a Pachube-style `/v2/feeds` endpoint with HTTP PUT.
pub struct FeedForwarder {
    client: reqwest::Client,
    base_url: String,
    api_key_header: HeaderName,
    api_key: HeaderValue,
}

impl FeedForwarder {
    pub fn new(config: &FeedServiceConfig, api_key: ApiKey) -> anyhow::Result<Self> {
        Self::with_builder(reqwest::Client::builder(), config, api_key)
    }

    /// Finishes `builder` with the configured request timeout.
    pub fn with_builder(
        builder: ClientBuilder,
        config: &FeedServiceConfig,
        api_key: ApiKey,
    ) -> anyhow::Result<Self> {
        let client = builder
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let api_key_header = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .with_context(|| format!("Invalid API key header name '{}'", config.api_key_header))?;

        let mut api_key = HeaderValue::from_str(api_key.expose())
            .context("API key contains characters not allowed in a header")?;
        api_key.set_sensitive(true);

        tracing::info!(
            "Feed forwarder initialised (service: {}, key header: {}, timeout: {}s)",
            config.base_url,
            api_key_header,
            config.request_timeout_secs
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key_header,
            api_key,
        })
    }

    pub fn url_for(&self, target: &FeedTarget) -> String {
        format!(
            "{}/v2/feeds/{}/datastreams/{}",
            self.base_url, target.feed, target.datastream
        )
    }
}

#[async_trait]
impl Forwarder for FeedForwarder {
    async fn forward(&self, target: &FeedTarget, reading: &Reading) -> anyhow::Result<ForwardOutcome> {
        let url = self.url_for(target);

        // `json` sets Content-Type: application/json
        let response = self
            .client
            .put(&url)
            .header(ACCEPT, "application/json")
            .header(self.api_key_header.clone(), self.api_key.clone())
            .json(&reading.to_body())
            .send()
            .await
            .with_context(|| format!("PUT {url} failed"))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("PUT {} ({}) -> {}", url, reading.as_str(), status);
        } else {
            tracing::warn!("PUT {} ({}) -> {}", url, reading.as_str(), status);
        }

        Ok(ForwardOutcome {
            status: status.as_u16(),
        })
    }
}
