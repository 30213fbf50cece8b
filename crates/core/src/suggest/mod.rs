use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub mod keyword;

#[async_trait::async_trait]
pub trait SymbolLookup: Send + Sync {
    /// Ranked candidate symbols for a non-empty partial query.
    async fn lookup(&self, query: &str) -> anyhow::Result<Vec<String>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionBatch {
    pub seq: u64,
    pub symbols: Vec<String>,
    /// A newer call resolved first; this batch was not made authoritative.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

/// Autocomplete adapter. Suggestions are advisory, so lookup failures degrade to an
/// empty batch instead of an error.
pub struct SymbolSuggester {
    lookup: Arc<dyn SymbolLookup>,
    issued: AtomicU64,
    current: tokio::sync::Mutex<SuggestionBatch>,
}

impl SymbolSuggester {
    pub fn new(lookup: Arc<dyn SymbolLookup>) -> Self {
        Self {
            lookup,
            issued: AtomicU64::new(0),
            current: tokio::sync::Mutex::new(SuggestionBatch::default()),
        }
    }

    pub async fn suggest(&self, query: &str) -> SuggestionBatch {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim();

        let symbols = if query.is_empty() {
            Vec::new()
        } else {
            match self.lookup.lookup(query).await {
                Ok(symbols) => dedup_in_rank_order(symbols),
                Err(err) => {
                    tracing::warn!(%query, error = %err, "symbol lookup failed; no suggestions");
                    Vec::new()
                }
            }
        };

        let mut current = self.current.lock().await;
        let stale = seq < current.seq;
        let batch = SuggestionBatch {
            seq,
            symbols,
            stale,
        };
        if stale {
            tracing::debug!(seq, latest = current.seq, "discarding stale suggestions");
        } else {
            *current = batch.clone();
        }
        batch
    }

    /// Most recent non-stale batch.
    pub async fn current(&self) -> SuggestionBatch {
        self.current.lock().await.clone()
    }

    /// Drops the current batch, e.g. once a candidate was selected. In-flight lookups
    /// issued before this call become stale.
    pub async fn clear(&self) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current.lock().await = SuggestionBatch {
            seq,
            symbols: Vec::new(),
            stale: false,
        };
    }
}

fn dedup_in_rank_order(symbols: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
