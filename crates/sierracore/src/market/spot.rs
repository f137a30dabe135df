//! 18 karat gold price per gram in Rial, computed from the international
//! spot price and the USD/IRR rate.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fetch::build_http_client;
use crate::core::config::market::{CURRENCY_API_URL, GOLD_API_URL, GRAMS_PER_TROY_OUNCE, KARAT_18_PURITY};
use crate::core::{FetchError, MarketError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotRates {
    pub usd_per_ounce: f64,
    pub irr_per_usd: f64,
    pub price_24k_per_gram_usd: f64,
    pub price_18k_per_gram_irr: f64,
}

impl SpotRates {
    pub fn compute(usd_per_ounce: f64, irr_per_usd: f64) -> Self {
        let price_24k_per_gram_usd = usd_per_ounce / GRAMS_PER_TROY_OUNCE;
        let price_18k_per_gram_usd = price_24k_per_gram_usd * KARAT_18_PURITY;

        Self {
            usd_per_ounce,
            irr_per_usd,
            price_24k_per_gram_usd,
            price_18k_per_gram_irr: price_18k_per_gram_usd * irr_per_usd,
        }
    }
}

/// `rates.USD`, else `price`. Zero counts as missing.
fn usd_per_ounce(body: &Value) -> Option<f64> {
    body.pointer("/rates/USD")
        .and_then(Value::as_f64)
        .or_else(|| body.get("price").and_then(Value::as_f64))
        .filter(|v| *v != 0.0)
}

/// `data.IRR.value`, else `data.IRR`, else `rates.IRR`. Zero counts as missing.
fn irr_per_usd(body: &Value) -> Option<f64> {
    ["/data/IRR/value", "/data/IRR", "/rates/IRR"]
        .iter()
        .find_map(|p| body.pointer(p).and_then(Value::as_f64))
        .filter(|v| *v != 0.0)
}

#[derive(Debug, Clone)]
pub struct SpotClient {
    client: Client,
    gold_url: String,
    fx_url: String,
}

impl SpotClient {
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self::with_urls(build_http_client()?, GOLD_API_URL, CURRENCY_API_URL))
    }

    pub fn with_urls(client: Client, gold_url: impl Into<String>, fx_url: impl Into<String>) -> Self {
        Self {
            client,
            gold_url: gold_url.into(),
            fx_url: fx_url.into(),
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(FetchError::Http(resp.status()));
        }

        Ok(resp.json().await?)
    }

    pub async fn fetch_rates(&self) -> Result<SpotRates, MarketError> {
        let gold = self.fetch_json(&self.gold_url).await?;
        let usd_per_ounce = usd_per_ounce(&gold).ok_or(MarketError::Unavailable("Gold price"))?;

        let fx = self.fetch_json(&self.fx_url).await?;
        let irr_per_usd = irr_per_usd(&fx).ok_or(MarketError::Unavailable("Currency data"))?;

        Ok(SpotRates::compute(usd_per_ounce, irr_per_usd))
    }
}
