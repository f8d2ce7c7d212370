use crate::core::analyzer::RateAnalyzer;
use crate::core::source::RateSource;
use crate::core::{RateReport, RateRequest};
use crate::domain::model::Breakdown;
use crate::utils::error::{RateError, Result};

pub const DEFAULT_MAX_RANGE_DAYS: usize = 366;

/// Resolve, analyze, assemble.
pub struct RateService {
    source: RateSource,
    analyzer: RateAnalyzer,
    max_range_days: usize,
}

impl RateService {
    pub fn new(source: RateSource) -> Self {
        Self {
            source,
            analyzer: RateAnalyzer::new(),
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }

    pub fn with_max_range_days(mut self, max_range_days: usize) -> Self {
        self.max_range_days = max_range_days;
        self
    }

    pub fn source(&self) -> &RateSource {
        &self.source
    }

    pub async fn run(&self, request: &RateRequest, breakdown: Breakdown) -> Result<RateReport> {
        let days = request.day_count();
        if days > self.max_range_days {
            return Err(RateError::RangeTooLarge {
                days,
                max_days: self.max_range_days,
            });
        }

        tracing::debug!(
            "Resolving {} rates from {} to {}",
            request.pair(),
            request.start(),
            request.end()
        );
        let resolved = self.source.resolve(request).await?;

        tracing::info!(
            "Resolved {} days of {} rates from {} source",
            resolved.series.len(),
            request.pair(),
            resolved.provenance
        );
        if !resolved.filled_dates.is_empty() {
            tracing::info!(
                "{} dates extended from nearest fallback rate",
                resolved.filled_dates.len()
            );
        }

        let analysis = self.analyzer.analyze(&resolved.series);

        Ok(RateReport {
            totals: analysis.totals,
            breakdown: match breakdown {
                Breakdown::Day => Some(analysis.breakdown),
                Breakdown::None => None,
            },
            source: resolved.provenance,
            filled_dates: resolved.filled_dates,
        })
    }
}
