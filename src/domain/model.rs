use crate::utils::error::{RateError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

const RATE_SCALE: f64 = 100_000.0;
const PCT_SCALE: f64 = 100.0;

/// Rates carry 5 decimal places.
pub fn round_rate(value: f64) -> f64 {
    (value * RATE_SCALE).round() / RATE_SCALE
}

/// Percentages carry 2 decimal places. Negative zero collapses to zero.
pub fn round_pct(value: f64) -> f64 {
    (value * PCT_SCALE).round() / PCT_SCALE + 0.0
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

impl CurrencyPair {
    /// Codes are upper-cased; their validity is the data source's concern.
    pub fn new(from: &str, to: &str) -> Result<Self> {
        let from = Self::normalize("from", from)?;
        let to = Self::normalize("to", to)?;
        Ok(Self { from, to })
    }

    fn normalize(field: &str, code: &str) -> Result<String> {
        let code = code.trim();
        if code.is_empty() {
            return Err(RateError::InvalidCurrency {
                field: field.to_string(),
                value: code.to_string(),
                reason: "currency code cannot be empty".to_string(),
            });
        }
        Ok(code.to_ascii_uppercase())
    }

    /// Provider quote key, e.g. `USDEUR`.
    pub fn quote_key(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    start: NaiveDate,
    end: NaiveDate,
    pair: CurrencyPair,
}

impl RateRequest {
    pub fn new(start: NaiveDate, end: NaiveDate, pair: CurrencyPair) -> Result<Self> {
        if start > end {
            return Err(RateError::InvalidRange { start, end });
        }
        Ok(Self { start, end, pair })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    pub fn day_count(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.day_count())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateRate {
    date: NaiveDate,
    rate: f64,
}

impl DateRate {
    pub fn new(date: NaiveDate, rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(RateError::MalformedSeries {
                message: format!("rate {} on {} must be finite and non-negative", rate, date),
            });
        }
        Ok(Self {
            date,
            rate: round_rate(rate),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

/// Gap-free, ascending run of daily rates from `start` to `end` inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSeries {
    entries: Vec<DateRate>,
}

impl RateSeries {
    pub fn new(start: NaiveDate, end: NaiveDate, entries: Vec<DateRate>) -> Result<Self> {
        if start > end {
            return Err(RateError::InvalidRange { start, end });
        }

        let expected = ((end - start).num_days() + 1) as usize;
        if entries.len() != expected {
            return Err(RateError::MalformedSeries {
                message: format!(
                    "expected {} daily rates from {} to {}, got {}",
                    expected,
                    start,
                    end,
                    entries.len()
                ),
            });
        }

        for (entry, date) in entries.iter().zip(start.iter_days()) {
            if entry.date != date {
                return Err(RateError::MalformedSeries {
                    message: format!("expected rate for {}, found {}", date, entry.date),
                });
            }
        }

        Ok(Self { entries })
    }

    /// Builds the series for `request` by asking `lookup` for every day in order.
    pub fn from_lookup<F>(request: &RateRequest, mut lookup: F) -> Result<Self>
    where
        F: FnMut(NaiveDate) -> Result<f64>,
    {
        let entries = request
            .dates()
            .map(|date| DateRate::new(date, lookup(date)?))
            .collect::<Result<Vec<_>>>()?;
        Self::new(request.start(), request.end(), entries)
    }

    pub fn entries(&self) -> &[DateRate] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> &DateRate {
        &self.entries[0]
    }

    pub fn last(&self) -> &DateRate {
        &self.entries[self.entries.len() - 1]
    }

    pub fn covers(&self, request: &RateRequest) -> bool {
        self.len() == request.day_count()
            && self.first().date() == request.start()
            && self.last().date() == request.end()
    }

    pub fn rates(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(DateRate::rate)
    }
}

/// Percentage change. `Undefined` means the base rate was zero and the
/// change could not be computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PctChange {
    Defined(f64),
    Undefined,
}

impl PctChange {
    pub fn value(&self) -> Option<f64> {
        match self {
            PctChange::Defined(value) => Some(*value),
            PctChange::Undefined => None,
        }
    }
}

impl fmt::Display for PctChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PctChange::Defined(value) => write!(f, "{:.2}", value),
            PctChange::Undefined => f.write_str("N/A"),
        }
    }
}

impl Serialize for PctChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PctChange::Defined(value) => serializer.serialize_f64(*value),
            PctChange::Undefined => serializer.serialize_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub rate: f64,
    pub pct_change: PctChange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub start_rate: f64,
    pub end_rate: f64,
    pub total_pct_change: PctChange,
    pub mean_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Live,
    Fallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Live => f.write_str("live"),
            Provenance::Fallback => f.write_str("fallback"),
        }
    }
}

/// A series together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub series: RateSeries,
    pub provenance: Provenance,
    /// Dates whose rate was extended from the nearest known date.
    pub filled_dates: Vec<NaiveDate>,
}

impl ResolvedSeries {
    pub fn live(series: RateSeries) -> Self {
        Self {
            series,
            provenance: Provenance::Live,
            filled_dates: Vec::new(),
        }
    }

    pub fn fallback(series: RateSeries, filled_dates: Vec<NaiveDate>) -> Self {
        Self {
            series,
            provenance: Provenance::Fallback,
            filled_dates,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakdown {
    #[default]
    Day,
    None,
}

impl std::str::FromStr for Breakdown {
    type Err = RateError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Breakdown::Day),
            "none" => Ok(Breakdown::None),
            other => Err(RateError::ValidationError {
                message: format!("breakdown must be 'day' or 'none', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breakdown::Day => f.write_str("day"),
            Breakdown::None => f.write_str("none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateReport {
    pub totals: Totals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<DayBreakdown>>,
    pub source: Provenance,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filled_dates: Vec<NaiveDate>,
}
