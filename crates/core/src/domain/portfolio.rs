use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::optimize::error::BackendError;

/// Weight vector returned by the optimization backend, one entry per filled symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    pub weights: Vec<f64>,

    /// Diagnostic chart file names reported by the backend, if any.
    #[serde(default)]
    pub images: Vec<String>,
}

impl OptimizationResponse {
    /// Checks positional alignment against the filled symbol list.
    pub fn ensure_aligned(&self, filled: usize) -> Result<(), BackendError> {
        if self.weights.len() != filled {
            return Err(BackendError::WeightCountMismatch {
                expected: filled,
                got: self.weights.len(),
            });
        }
        Ok(())
    }
}

/// Outcome of one branding lookup. `logo_url == None` is the absence-marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub symbol: String,
    pub logo_url: Option<String>,
}

impl EnrichmentResult {
    pub fn found(symbol: impl Into<String>, logo_url: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            logo_url: Some(logo_url.into()),
        }
    }

    pub fn absent(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            logo_url: None,
        }
    }
}

/// Enrichment outcomes keyed by symbol. Later results for the same symbol win.
#[derive(Debug, Clone, Default)]
pub struct LogoMap {
    by_symbol: HashMap<String, Option<String>>,
}

impl LogoMap {
    pub fn from_results(results: impl IntoIterator<Item = EnrichmentResult>) -> Self {
        let mut by_symbol = HashMap::new();
        for result in results {
            by_symbol.insert(result.symbol, result.logo_url);
        }
        Self { by_symbol }
    }

    pub fn logo_for(&self, symbol: &str) -> Option<&str> {
        self.by_symbol.get(symbol).and_then(|url| url.as_deref())
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    pub ticker: String,
    pub weight: f64,
    pub logo_url: Option<String>,
}

impl ViewRow {
    /// Weight as a percentage with one decimal, e.g. `40.0%`.
    pub fn weight_percent(&self) -> String {
        format!("{:.1}%", self.weight * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ViewRow>,
    pub images: Vec<String>,
}

impl ViewModel {
    /// Pairs each filled symbol with `weights[i]` and its logo.
    ///
    /// `filled` must already be aligned with `response.weights`.
    pub fn assemble(filled: &[String], response: &OptimizationResponse, logos: &LogoMap) -> Self {
        let rows = filled
            .iter()
            .zip(&response.weights)
            .map(|(ticker, weight)| ViewRow {
                ticker: ticker.clone(),
                weight: *weight,
                logo_url: logos.logo_for(ticker).map(str::to_string),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            rows,
            images: response.images.clone(),
        }
    }
}
