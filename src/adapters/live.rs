use crate::domain::model::{CurrencyPair, Provenance, RateRequest, RateSeries, ResolvedSeries};
use crate::domain::ports::RateStrategy;
use crate::utils::error::{RateError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct LiveSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub day_by_day: bool,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse<Q> {
    #[serde(default)]
    success: bool,
    quotes: Option<Q>,
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl ProviderErrorBody {
    fn describe(&self) -> String {
        let code = self.code.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string());
        let detail = self
            .info
            .as_deref()
            .or(self.kind.as_deref())
            .unwrap_or("unknown error");
        format!("{} ({})", detail, code)
    }
}

type HistoricalQuotes = HashMap<String, f64>;
type TimeframeQuotes = BTreeMap<String, HashMap<String, f64>>;

/// exchangerate.host style client: `historical` for one day, `timeframe` for ranges.
#[derive(Debug, Clone)]
pub struct LiveStrategy {
    client: Client,
    settings: LiveSettings,
}

impl LiveStrategy {
    pub fn new(settings: LiveSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn get_quotes<Q: DeserializeOwned>(
        &self,
        path: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<Q> {
        if let Some(key) = &self.settings.api_key {
            params.push(("access_key", key.clone()));
        }

        let url = self.endpoint(path);
        tracing::debug!("Making provider request to: {}", url);
        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        tracing::debug!("Provider response status: {}", status);

        if !status.is_success() {
            return Err(RateError::ProviderError {
                message: format!("{} returned HTTP {}", path, status),
            });
        }

        let body: ProviderResponse<Q> = response.json().await?;
        if !body.success {
            let reason = body
                .error
                .map(|e| e.describe())
                .unwrap_or_else(|| "success flag not set".to_string());
            return Err(RateError::ProviderError {
                message: format!("{} rejected request: {}", path, reason),
            });
        }

        body.quotes.ok_or_else(|| RateError::ProviderError {
            message: format!("{} response has no quotes", path),
        })
    }

    async fn historical(&self, date: NaiveDate, pair: &CurrencyPair) -> Result<f64> {
        let quotes: HistoricalQuotes = self
            .get_quotes(
                "historical",
                vec![
                    ("date", date.format(DATE_FORMAT).to_string()),
                    ("source", pair.from.clone()),
                    ("currencies", pair.to.clone()),
                ],
            )
            .await?;

        quotes
            .get(&pair.quote_key())
            .copied()
            .ok_or_else(|| RateError::ProviderError {
                message: format!("no {} quote for {}", pair.quote_key(), date),
            })
    }

    async fn timeframe(&self, request: &RateRequest) -> Result<BTreeMap<NaiveDate, f64>> {
        let pair = request.pair();
        let quotes: TimeframeQuotes = self
            .get_quotes(
                "timeframe",
                vec![
                    ("start_date", request.start().format(DATE_FORMAT).to_string()),
                    ("end_date", request.end().format(DATE_FORMAT).to_string()),
                    ("source", pair.from.clone()),
                    ("currencies", pair.to.clone()),
                ],
            )
            .await?;

        let key = pair.quote_key();
        let mut rates = BTreeMap::new();
        for (date_str, day_quotes) in quotes {
            let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|_| {
                RateError::MalformedSeries {
                    message: format!("provider returned invalid date '{}'", date_str),
                }
            })?;
            if let Some(rate) = day_quotes.get(&key) {
                rates.insert(date, *rate);
            }
        }
        Ok(rates)
    }

    async fn day_by_day(&self, request: &RateRequest) -> Result<BTreeMap<NaiveDate, f64>> {
        let mut rates = BTreeMap::new();
        for date in request.dates() {
            let rate = self.historical(date, request.pair()).await?;
            rates.insert(date, rate);
        }
        Ok(rates)
    }

    async fn range_rates(&self, request: &RateRequest) -> Result<BTreeMap<NaiveDate, f64>> {
        if request.start() == request.end() {
            let rate = self.historical(request.start(), request.pair()).await?;
            return Ok(BTreeMap::from([(request.start(), rate)]));
        }

        match self.timeframe(request).await {
            Ok(rates) => Ok(rates),
            Err(RateError::ProviderError { message }) if self.settings.day_by_day => {
                tracing::warn!("Timeframe request failed ({}), trying day by day", message);
                self.day_by_day(request).await
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl RateStrategy for LiveStrategy {
    fn provenance(&self) -> Provenance {
        Provenance::Live
    }

    async fn fetch(&self, request: &RateRequest) -> Result<ResolvedSeries> {
        let rates = self.range_rates(request).await?;

        // A live series is all-or-nothing; a missing day sends the request to fallback.
        let series = RateSeries::from_lookup(request, |date| {
            rates
                .get(&date)
                .copied()
                .ok_or_else(|| RateError::MalformedSeries {
                    message: format!("live provider returned no rate for {}", date),
                })
        })?;

        Ok(ResolvedSeries::live(series))
    }
}
