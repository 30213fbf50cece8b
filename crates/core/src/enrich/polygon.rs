use crate::config::{env_u64, Settings};
use crate::domain::contract::TickerReferenceBody;
use crate::domain::portfolio::EnrichmentResult;
use crate::enrich::EnrichmentClient;
use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Resolves a ticker's branding icon through the Polygon ticker reference endpoint.
#[derive(Debug, Clone)]
pub struct PolygonBrandingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PolygonBrandingClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_polygon_api_key()?;
        let timeout_secs = env_u64("POLYGON_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        Self::new(
            settings.polygon_base_url(),
            api_key,
            Duration::from_secs(timeout_secs),
        )
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build polygon http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// The icon URL needs the same credential appended to be fetchable by a browser.
    fn displayable_url(&self, icon_url: &str) -> String {
        format!("{icon_url}?apiKey={}", self.api_key)
    }

    /// The symbol is free-form slot text, so it goes in as one escaped path segment.
    fn ticker_url(&self, symbol: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(self.base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid polygon base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("polygon base url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v3", "reference", "tickers", symbol]);
        Ok(url)
    }

    async fn fetch_icon_url(&self, symbol: &str) -> Result<Option<String>> {
        let url = self.ticker_url(symbol)?;

        let res = self
            .http
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .context("polygon ticker request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read polygon response")?;
        if !status.is_success() {
            anyhow::bail!("polygon HTTP {status}");
        }

        let body = serde_json::from_str::<TickerReferenceBody>(&text)
            .context("failed to parse polygon ticker response")?;
        Ok(body.icon_url().map(|icon| self.displayable_url(icon)))
    }
}

#[async_trait::async_trait]
impl EnrichmentClient for PolygonBrandingClient {
    async fn enrich(&self, symbol: &str) -> EnrichmentResult {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return EnrichmentResult::absent(symbol);
        }

        match self.fetch_icon_url(symbol).await {
            Ok(Some(url)) => EnrichmentResult::found(symbol, url),
            Ok(None) => {
                tracing::warn!(%symbol, "polygon response has no branding icon");
                EnrichmentResult::absent(symbol)
            }
            Err(err) => {
                tracing::warn!(%symbol, error = %err, "logo lookup failed; rendering without logo");
                EnrichmentResult::absent(symbol)
            }
        }
    }
}
