use crate::domain::portfolio::OptimizationResponse;
use crate::optimize::error::BackendError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeRequestBody<'a> {
    pub array: &'a [String],
}

/// Body of the optimization backend's reply. On a data problem the backend answers
/// `{"error": "..."}` with a success status instead of the weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrpWeightsBody {
    #[serde(default)]
    pub hrp_weights: Option<Vec<f64>>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HrpWeightsBody {
    pub fn validate_and_into_response(self) -> Result<OptimizationResponse, BackendError> {
        if let Some(message) = self.error {
            return Err(BackendError::Reported(message));
        }

        let weights = self
            .hrp_weights
            .ok_or_else(|| BackendError::Decode("response has no hrp_weights field".to_string()))?;

        Ok(OptimizationResponse {
            weights,
            images: self.images,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordMatch {
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickerReferenceBody {
    #[serde(default)]
    pub results: Option<TickerDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickerDetails {
    #[serde(default)]
    pub branding: Option<Branding>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Branding {
    #[serde(default)]
    pub icon_url: Option<String>,
}

impl TickerReferenceBody {
    pub fn icon_url(&self) -> Option<&str> {
        self.results
            .as_ref()?
            .branding
            .as_ref()?
            .icon_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
