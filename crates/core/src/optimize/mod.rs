use crate::domain::portfolio::OptimizationResponse;
use crate::optimize::error::BackendError;

pub mod error;
pub mod hrp;

#[async_trait::async_trait]
pub trait OptimizationClient: Send + Sync {
    /// Sends `symbols` as-is; the caller has already validated the filled count.
    async fn optimize(&self, symbols: &[String]) -> Result<OptimizationResponse, BackendError>;
}
