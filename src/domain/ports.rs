use crate::domain::model::{Provenance, RateRequest, ResolvedSeries};
use crate::utils::error::Result;
use async_trait::async_trait;

/// One way of producing a complete rate series for a request.
#[async_trait]
pub trait RateStrategy: Send + Sync {
    fn provenance(&self) -> Provenance;

    async fn fetch(&self, request: &RateRequest) -> Result<ResolvedSeries>;
}
