use crate::app::response::{
    ApiError, ChartResponse, FinanceResponse, HealthResponse, RequestMetadata,
};
use crate::app::SharedState;
use crate::domain::model::{Breakdown, CurrencyPair, RateRequest};
use crate::utils::validation::{parse_date, validate_currency_code};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

pub const DEFAULT_FROM: &str = "USD";
pub const DEFAULT_TO: &str = "EUR";

#[derive(Debug, Default, Deserialize)]
pub struct RateQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub breakdown: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RateQuery {
    /// Validates raw query values into a typed request.
    pub fn parse(&self) -> Result<(RateRequest, Breakdown), ApiError> {
        let (start, end) = match (self.start.as_deref(), self.end.as_deref()) {
            (Some(start), Some(end)) if !start.trim().is_empty() && !end.trim().is_empty() => {
                (start, end)
            }
            _ => return Err(ApiError::bad_request("Both start and end dates are required")),
        };

        let start = parse_date("start", start)?;
        let end = parse_date("end", end)?;
        let from = validate_currency_code("from", self.from.as_deref().unwrap_or(DEFAULT_FROM))?;
        let to = validate_currency_code("to", self.to.as_deref().unwrap_or(DEFAULT_TO))?;
        let breakdown = match self.breakdown.as_deref() {
            Some(value) => value.parse::<Breakdown>()?,
            None => Breakdown::Day,
        };

        let request = RateRequest::new(start, end, CurrencyPair::new(&from, &to)?)?;
        Ok((request, breakdown))
    }
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.service_name))
}

pub async fn finance(
    State(state): State<SharedState>,
    Query(query): Query<RateQuery>,
) -> Result<Json<FinanceResponse>, ApiError> {
    let (request, breakdown) = query.parse()?;
    let report = state.service.run(&request, breakdown).await?;
    let metadata = RequestMetadata::new(&request, breakdown, report.source);

    Ok(Json(FinanceResponse { report, metadata }))
}

pub async fn chart_rates(
    State(state): State<SharedState>,
    Query(query): Query<RateQuery>,
) -> Result<Json<ChartResponse>, ApiError> {
    let (request, _) = query.parse()?;
    let report = state.service.run(&request, Breakdown::Day).await?;
    let metadata = RequestMetadata::new(&request, Breakdown::Day, report.source);

    Ok(Json(ChartResponse::new(report, metadata)))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found()
}
