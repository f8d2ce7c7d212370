use crate::domain::model::{
    CurrencyPair, DateRate, Provenance, RateRequest, RateSeries, ResolvedSeries,
};
use crate::domain::ports::RateStrategy;
use crate::utils::error::{RateError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// Sample dataset compiled into the binary.
pub const BUNDLED_DATASET: &str = include_str!("../../data/sample_api.json");

#[derive(Debug, Deserialize)]
struct DatasetFile {
    base: String,
    rates: BTreeMap<String, HashMap<String, f64>>,
}

/// Static date→rate table loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDataset {
    base: String,
    quotes: HashMap<String, BTreeMap<NaiveDate, f64>>,
}

impl FallbackDataset {
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_DATASET)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: DatasetFile = serde_json::from_str(content)?;

        let mut quotes: HashMap<String, BTreeMap<NaiveDate, f64>> = HashMap::new();
        for (date_str, rates) in file.rates {
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|_| {
                RateError::ConfigError {
                    message: format!("fallback dataset has invalid date '{}'", date_str),
                }
            })?;
            for (currency, rate) in rates {
                let rate = DateRate::new(date, rate)
                    .map_err(|e| RateError::ConfigError {
                        message: format!("fallback dataset {} on {}: {}", currency, date_str, e),
                    })?
                    .rate();
                quotes
                    .entry(currency.to_ascii_uppercase())
                    .or_default()
                    .insert(date, rate);
            }
        }

        if quotes.is_empty() {
            return Err(RateError::ConfigError {
                message: "fallback dataset contains no rates".to_string(),
            });
        }

        Ok(Self {
            base: file.base.trim().to_ascii_uppercase(),
            quotes,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote_currencies(&self) -> Vec<&str> {
        let mut currencies: Vec<&str> = self.quotes.keys().map(String::as_str).collect();
        currencies.sort_unstable();
        currencies
    }

    /// First and last known date for `pair`.
    pub fn window(&self, pair: &CurrencyPair) -> Option<(NaiveDate, NaiveDate)> {
        let rates = self.rates_for(pair)?;
        let first = rates.keys().next()?;
        let last = rates.keys().next_back()?;
        Some((*first, *last))
    }

    fn rates_for(&self, pair: &CurrencyPair) -> Option<&BTreeMap<NaiveDate, f64>> {
        if pair.from != self.base {
            return None;
        }
        self.quotes.get(&pair.to)
    }

    /// Exact rate, or the nearest known date's rate. Ties prefer the earlier date.
    fn nearest(rates: &BTreeMap<NaiveDate, f64>, date: NaiveDate) -> Option<(f64, bool)> {
        if let Some(rate) = rates.get(&date) {
            return Some((*rate, false));
        }

        let before = rates.range(..date).next_back();
        let after = rates.range(date..).next();
        let rate = match (before, after) {
            (Some((b_date, b_rate)), Some((a_date, a_rate))) => {
                if (date - *b_date) <= (*a_date - date) {
                    *b_rate
                } else {
                    *a_rate
                }
            }
            (Some((_, rate)), None) | (None, Some((_, rate))) => *rate,
            (None, None) => return None,
        };
        Some((rate, true))
    }

    pub fn series_for(&self, request: &RateRequest) -> Result<ResolvedSeries> {
        let pair = request.pair();
        let unavailable = |reason: String| RateError::SourceUnavailable {
            pair: pair.to_string(),
            start: request.start(),
            end: request.end(),
            reason,
        };

        let rates = self.rates_for(pair).ok_or_else(|| {
            unavailable(format!(
                "fallback dataset only covers {} to [{}]",
                self.base,
                self.quote_currencies().join(", ")
            ))
        })?;
        let (window_start, window_end) = self
            .window(pair)
            .ok_or_else(|| unavailable("fallback dataset has no rates for pair".to_string()))?;

        if request.end() < window_start || request.start() > window_end {
            return Err(unavailable(format!(
                "requested range lies outside fallback window {} to {}",
                window_start, window_end
            )));
        }

        let mut filled_dates = Vec::new();
        let series = RateSeries::from_lookup(request, |date| {
            let (rate, filled) = Self::nearest(rates, date)
                .ok_or_else(|| unavailable(format!("no fallback rate near {}", date)))?;
            if filled {
                filled_dates.push(date);
            }
            Ok(rate)
        })?;

        Ok(ResolvedSeries::fallback(series, filled_dates))
    }
}

#[derive(Debug, Clone)]
pub struct FallbackStrategy {
    dataset: Arc<FallbackDataset>,
}

impl FallbackStrategy {
    pub fn new(dataset: Arc<FallbackDataset>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl RateStrategy for FallbackStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::Fallback
    }

    async fn fetch(&self, request: &RateRequest) -> Result<ResolvedSeries> {
        let resolved = self.dataset.series_for(request)?;
        if !resolved.filled_dates.is_empty() {
            tracing::debug!(
                "Extended {} of {} fallback dates from nearest known rate",
                resolved.filled_dates.len(),
                resolved.series.len()
            );
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn request(start: NaiveDate, end: NaiveDate, to: &str) -> RateRequest {
        RateRequest::new(start, end, CurrencyPair::new("USD", to).unwrap()).unwrap()
    }

    #[test]
    fn test_bundled_dataset_loads() {
        let dataset = FallbackDataset::bundled().unwrap();
        let pair = CurrencyPair::new("USD", "EUR").unwrap();

        assert_eq!(dataset.base(), "USD");
        assert_eq!(dataset.quote_currencies(), vec!["EUR", "GBP"]);
        assert_eq!(dataset.window(&pair), Some((date(7, 1), date(7, 10))));
    }

    #[test]
    fn test_range_inside_window_matches_dataset() {
        let dataset = FallbackDataset::bundled().unwrap();
        let resolved = dataset.series_for(&request(date(7, 1), date(7, 3), "EUR")).unwrap();

        let rates: Vec<f64> = resolved.series.rates().collect();
        assert_eq!(rates, vec![0.85234, 0.85891, 0.85456]);
        assert_eq!(resolved.provenance, Provenance::Fallback);
        assert!(resolved.filled_dates.is_empty());
    }

    #[test]
    fn test_partial_overlap_extends_boundary_rates() {
        let dataset = FallbackDataset::bundled().unwrap();
        let resolved = dataset
            .series_for(&request(date(6, 29), date(7, 2), "EUR"))
            .unwrap();

        let rates: Vec<f64> = resolved.series.rates().collect();
        assert_eq!(rates, vec![0.85234, 0.85234, 0.85234, 0.85891]);
        assert_eq!(resolved.filled_dates, vec![date(6, 29), date(6, 30)]);

        let tail = dataset
            .series_for(&request(date(7, 9), date(7, 12), "EUR"))
            .unwrap();
        assert_eq!(tail.series.last().rate(), 0.85901);
        assert_eq!(tail.filled_dates, vec![date(7, 11), date(7, 12)]);
    }

    #[test]
    fn test_interior_gap_uses_nearest_date() {
        let dataset = FallbackDataset::from_json_str(
            r#"{"base":"USD","rates":{
                "2025-07-01":{"EUR":1.0},
                "2025-07-04":{"EUR":2.0},
                "2025-07-06":{"EUR":3.0}
            }}"#,
        )
        .unwrap();

        let resolved = dataset
            .series_for(&request(date(7, 1), date(7, 6), "EUR"))
            .unwrap();
        let rates: Vec<f64> = resolved.series.rates().collect();
        // 07-02 is nearer 07-01, 07-03 nearer 07-04, 07-05 ties and takes 07-04
        assert_eq!(rates, vec![1.0, 1.0, 2.0, 2.0, 2.0, 3.0]);
        assert_eq!(
            resolved.filled_dates,
            vec![date(7, 2), date(7, 3), date(7, 5)]
        );
    }

    #[test]
    fn test_range_outside_window_is_unavailable() {
        let dataset = FallbackDataset::bundled().unwrap();
        let err = dataset
            .series_for(&request(date(1, 1), date(1, 5), "EUR"))
            .unwrap_err();
        assert!(matches!(err, RateError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_unknown_pair_is_unavailable() {
        let dataset = FallbackDataset::bundled().unwrap();
        let err = dataset
            .series_for(&request(date(7, 1), date(7, 2), "JPY"))
            .unwrap_err();
        assert!(matches!(err, RateError::SourceUnavailable { .. }));

        let eur_base = RateRequest::new(
            date(7, 1),
            date(7, 2),
            CurrencyPair::new("EUR", "USD").unwrap(),
        )
        .unwrap();
        assert!(dataset.series_for(&eur_base).is_err());
    }

    #[test]
    fn test_invalid_dataset_is_rejected() {
        assert!(FallbackDataset::from_json_str("not json").is_err());
        assert!(FallbackDataset::from_json_str(r#"{"base":"USD","rates":{}}"#).is_err());
        assert!(FallbackDataset::from_json_str(
            r#"{"base":"USD","rates":{"07/01/2025":{"EUR":1.0}}}"#
        )
        .is_err());
    }

    #[test]
    fn test_negative_rate_fails_at_load() {
        let err = FallbackDataset::from_json_str(
            r#"{"base":"USD","rates":{
                "2025-07-01":{"EUR":0.85},
                "2025-07-02":{"EUR":-0.85}
            }}"#,
        )
        .unwrap_err();

        assert!(matches!(err, RateError::ConfigError { .. }));
        assert!(err.to_string().contains("2025-07-02"));
    }

    #[tokio::test]
    async fn test_strategy_reports_fallback_provenance() {
        let strategy = FallbackStrategy::new(Arc::new(FallbackDataset::bundled().unwrap()));
        assert_eq!(strategy.provenance(), Provenance::Fallback);

        let resolved = strategy
            .fetch(&request(date(7, 4), date(7, 4), "GBP"))
            .await
            .unwrap();
        assert_eq!(resolved.series.first().rate(), 0.72765);
    }
}
