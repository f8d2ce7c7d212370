use crate::domain::model::{Breakdown, Provenance, RateReport, RateRequest, Totals};
use crate::utils::error::{ErrorCategory, RateError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

pub const EXAMPLE_QUERY: &str = "/finance?start=2025-07-01&end=2025-07-03";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<&'static str>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                details: None,
                example: Some(EXAMPLE_QUERY),
            },
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody {
                error: "Not found".to_string(),
                details: None,
                example: None,
            },
        }
    }
}

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        let status = match err.category() {
            ErrorCategory::Input => StatusCode::BAD_REQUEST,
            ErrorCategory::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Request failed: {}", err);
            }
            _ => tracing::warn!("Request rejected ({}): {}", status, err),
        }

        let example = matches!(err, RateError::InvalidDate { .. }).then_some(EXAMPLE_QUERY);
        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
                details: Some(err.recovery_suggestion()),
                example,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(service: &'static str) -> Self {
        Self {
            status: "healthy",
            service,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestMetadata {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub from_currency: String,
    pub to_currency: String,
    pub breakdown: Breakdown,
    pub source: Provenance,
    pub timestamp: String,
}

impl RequestMetadata {
    pub fn new(request: &RateRequest, breakdown: Breakdown, source: Provenance) -> Self {
        Self {
            start_date: request.start(),
            end_date: request.end(),
            from_currency: request.pair().from.clone(),
            to_currency: request.pair().to.clone(),
            breakdown,
            source,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FinanceResponse {
    #[serde(flatten)]
    pub report: RateReport,
    pub metadata: RequestMetadata,
}

/// Chart-friendly columns. `changes` holds `null` where the change is undefined.
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub labels: Vec<NaiveDate>,
    pub rates: Vec<f64>,
    pub changes: Vec<Option<f64>>,
    pub totals: Totals,
    pub source: Provenance,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filled_dates: Vec<NaiveDate>,
    pub metadata: RequestMetadata,
}

impl ChartResponse {
    pub fn new(report: RateReport, metadata: RequestMetadata) -> Self {
        let days = report.breakdown.unwrap_or_default();
        Self {
            labels: days.iter().map(|d| d.date).collect(),
            rates: days.iter().map(|d| d.rate).collect(),
            changes: days.iter().map(|d| d.pct_change.value()).collect(),
            totals: report.totals,
            source: report.source,
            filled_dates: report.filled_dates,
            metadata,
        }
    }
}
