use crate::config::{env_u64, Settings};
use crate::domain::contract::KeywordMatch;
use crate::suggest::SymbolLookup;
use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Ticker keyword search service: `GET {base}/keyword/{query}`.
#[derive(Debug, Clone)]
pub struct KeywordLookupClient {
    http: reqwest::Client,
    base_url: String,
}

impl KeywordLookupClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout_secs = env_u64("SUGGEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        Self::new(settings.suggest_base_url(), Duration::from_secs(timeout_secs))
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build lookup http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, query: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(self.base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid lookup base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("lookup base url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .push("keyword")
            .push(query);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl SymbolLookup for KeywordLookupClient {
    async fn lookup(&self, query: &str) -> Result<Vec<String>> {
        let res = self
            .http
            .get(self.url(query)?)
            .send()
            .await
            .context("symbol lookup request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read lookup response")?;
        if !status.is_success() {
            anyhow::bail!("symbol lookup HTTP {status}: {text}");
        }

        let matches = serde_json::from_str::<Vec<KeywordMatch>>(&text)
            .with_context(|| format!("lookup response is not a list of matches: {text}"))?;

        Ok(matches.into_iter().filter_map(|m| m.symbol).collect())
    }
}
