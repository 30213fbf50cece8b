use crate::domain::portfolio::{EnrichmentResult, LogoMap};
use futures::future::join_all;

pub mod polygon;

/// Branding lookup for one symbol.
///
/// Implementations must always resolve: any failure becomes
/// [`EnrichmentResult::absent`] and is only logged.
#[async_trait::async_trait]
pub trait EnrichmentClient: Send + Sync {
    async fn enrich(&self, symbol: &str) -> EnrichmentResult;
}

/// Stand-in used when no branding credential is configured; every row renders without a logo.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEnrichment;

#[async_trait::async_trait]
impl EnrichmentClient for DisabledEnrichment {
    async fn enrich(&self, symbol: &str) -> EnrichmentResult {
        EnrichmentResult::absent(symbol.trim())
    }
}

/// Issues one lookup per symbol concurrently and joins once all have resolved.
pub async fn enrich_all(client: &dyn EnrichmentClient, symbols: &[String]) -> LogoMap {
    let futures: Vec<_> = symbols
        .iter()
        .map(|symbol| client.enrich(symbol))
        .collect();

    let results = join_all(futures).await;

    let found = results.iter().filter(|r| r.logo_url.is_some()).count();
    tracing::debug!(requested = symbols.len(), found, "enrichment batch resolved");

    LogoMap::from_results(results)
}
