//! Fetching the price page.

use async_trait::async_trait;
use reqwest::Client;

use super::summary::MarketSummary;
use crate::core::config;
use crate::core::{FetchError, MarketError};

/// Anything that can produce the current market summary.
///
/// The bot depends on this rather than on [`MarketClient`] so handlers can be
/// exercised without the network.
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn market_summary(&self) -> Result<MarketSummary, MarketError>;
}

/// Builds the shared HTTP client with the configured timeout and user agent.
pub fn build_http_client() -> Result<Client, FetchError> {
    Ok(Client::builder()
        .timeout(config::network::timeout())
        .user_agent(config::network::USER_AGENT)
        .build()?)
}

/// GETs `url` and returns the body text, failing on non-2xx statuses.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?;

    if !resp.status().is_success() {
        return Err(FetchError::Http(resp.status()));
    }

    Ok(resp.text().await?)
}

/// Scrapes the market page at a fixed URL.
#[derive(Debug, Clone)]
pub struct MarketClient {
    client: Client,
    url: String,
}

impl MarketClient {
    pub fn new(url: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self::with_client(build_http_client()?, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }

    pub async fn fetch_document(&self) -> Result<String, FetchError> {
        fetch_text(&self.client, &self.url).await
    }

    pub async fn fetch_summary(&self) -> Result<MarketSummary, MarketError> {
        let html = self.fetch_document().await?;
        log::debug!("Fetched {} bytes from {}", html.len(), self.url);
        MarketSummary::from_document(&html)
    }
}

#[async_trait]
impl MarketSource for MarketClient {
    async fn market_summary(&self) -> Result<MarketSummary, MarketError> {
        self.fetch_summary().await
    }
}
