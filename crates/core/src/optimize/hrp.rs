use crate::config::{env_u64, Settings};
use crate::domain::contract::{HrpWeightsBody, OptimizeRequestBody};
use crate::domain::portfolio::OptimizationResponse;
use crate::optimize::error::BackendError;
use crate::optimize::OptimizationClient;
use anyhow::Context;
use std::time::Duration;

// The backend pulls price history for every symbol before answering.
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PATH: &str = "/double";

#[derive(Debug, Clone)]
pub struct HrpBackendClient {
    http: reqwest::Client,
    base_url: String,
    path: String,
}

impl HrpBackendClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let timeout_secs = env_u64("OPTIMIZER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let path = std::env::var("OPTIMIZER_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        let mut client = Self::new(
            settings.optimizer_base_url(),
            Duration::from_secs(timeout_secs),
        )?;
        client.path = path;
        Ok(client)
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build optimizer http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            path: DEFAULT_PATH.to_string(),
        })
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl OptimizationClient for HrpBackendClient {
    async fn optimize(&self, symbols: &[String]) -> Result<OptimizationResponse, BackendError> {
        let res = self
            .http
            .post(self.url())
            .json(&OptimizeRequestBody { array: symbols })
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|err| BackendError::Transport(format!("failed to read response body: {err}")))?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = serde_json::from_str::<HrpWeightsBody>(&text)
            .map_err(|err| BackendError::Decode(format!("{err}: {text}")))?;
        let response = body.validate_and_into_response()?;

        tracing::debug!(
            symbols = symbols.len(),
            weights = response.weights.len(),
            "optimizer responded"
        );
        Ok(response)
    }
}
