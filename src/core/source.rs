use crate::core::{RateRequest, RateStrategy, ResolvedSeries};
use crate::utils::error::{RateError, Result};
use std::time::Duration;
use tokio::time::timeout;

/// Resolves a request to a complete series: live first, fallback on any live failure.
pub struct RateSource {
    live: Option<Box<dyn RateStrategy>>,
    fallback: Box<dyn RateStrategy>,
    live_timeout: Duration,
}

impl RateSource {
    pub fn new(
        live: Box<dyn RateStrategy>,
        fallback: Box<dyn RateStrategy>,
        live_timeout: Duration,
    ) -> Self {
        Self {
            live: Some(live),
            fallback,
            live_timeout,
        }
    }

    /// Fallback only; used when the provider is disabled.
    pub fn offline(fallback: Box<dyn RateStrategy>) -> Self {
        Self {
            live: None,
            fallback,
            live_timeout: Duration::ZERO,
        }
    }

    pub fn has_live(&self) -> bool {
        self.live.is_some()
    }

    async fn fetch_live(
        &self,
        live: &dyn RateStrategy,
        request: &RateRequest,
    ) -> Result<ResolvedSeries> {
        match timeout(self.live_timeout, live.fetch(request)).await {
            Ok(result) => result,
            Err(_) => Err(RateError::Timeout {
                millis: self.live_timeout.as_millis(),
            }),
        }
    }

    async fn try_live(&self, request: &RateRequest) -> Option<ResolvedSeries> {
        let live = self.live.as_deref()?;

        match self.fetch_live(live, request).await {
            Ok(resolved) if resolved.series.covers(request) => {
                tracing::debug!("Resolved {} via {} strategy", request.pair(), live.provenance());
                Some(resolved)
            }
            Ok(_) => {
                tracing::warn!("Live provider returned an incomplete series, using fallback data");
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Live provider failed for {}: {}, using fallback data",
                    request.pair(),
                    e
                );
                None
            }
        }
    }

    pub async fn resolve(&self, request: &RateRequest) -> Result<ResolvedSeries> {
        if let Some(resolved) = self.try_live(request).await {
            return Ok(resolved);
        }

        self.fallback.fetch(request).await.map_err(|e| match e {
            RateError::SourceUnavailable { .. } => e,
            other => RateError::SourceUnavailable {
                pair: request.pair().to_string(),
                start: request.start(),
                end: request.end(),
                reason: other.to_string(),
            },
        })
    }
}
