use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid currency '{value}' for {field}: {reason}")]
    InvalidCurrency {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid date '{value}' for {field}: expected YYYY-MM-DD")]
    InvalidDate { field: String, value: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Date range of {days} days exceeds the limit of {max_days} days")]
    RangeTooLarge { days: usize, max_days: usize },

    #[error("No rate source available for {pair} from {start} to {end}: {reason}")]
    SourceUnavailable {
        pair: String,
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },

    #[error("API request failed: {0}")]
    ApiError(reqwest::Error),

    #[error("Provider error: {message}")]
    ProviderError { message: String },

    #[error("Live provider timed out after {millis}ms")]
    Timeout { millis: u128 },

    #[error("Malformed rate series: {message}")]
    MalformedSeries { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad caller input; reported, never corrected.
    Input,
    /// Live provider failures. Recovered by falling back.
    Provider,
    /// Both live and fallback exhausted.
    Unavailable,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RateError::InvalidRange { .. }
            | RateError::InvalidCurrency { .. }
            | RateError::InvalidDate { .. }
            | RateError::ValidationError { .. }
            | RateError::RangeTooLarge { .. } => ErrorCategory::Input,
            RateError::ApiError(_)
            | RateError::ProviderError { .. }
            | RateError::Timeout { .. }
            | RateError::MalformedSeries { .. } => ErrorCategory::Provider,
            RateError::SourceUnavailable { .. } => ErrorCategory::Unavailable,
            RateError::ConfigError { .. }
            | RateError::ConfigValidationError { .. }
            | RateError::InvalidConfigValueError { .. }
            | RateError::MissingConfigError { .. } => ErrorCategory::Configuration,
            RateError::IoError(_) | RateError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Provider => ErrorSeverity::Medium,
            ErrorCategory::Unavailable | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RateError::InvalidRange { .. } => {
                "Make sure the start date is on or before the end date".to_string()
            }
            RateError::InvalidCurrency { .. } => {
                "Use a three-letter ISO 4217 currency code such as USD or EUR".to_string()
            }
            RateError::InvalidDate { .. } => "Use the YYYY-MM-DD date format".to_string(),
            RateError::RangeTooLarge { max_days, .. } => {
                format!("Split the request into ranges of at most {} days", max_days)
            }
            RateError::SourceUnavailable { .. } => {
                "Check provider connectivity or request a range covered by the fallback dataset"
                    .to_string()
            }
            RateError::ApiError(_) | RateError::Timeout { .. } => {
                "Check network connectivity and provider.base_url".to_string()
            }
            RateError::ProviderError { .. } => {
                "Check provider.api_key and the provider plan limits".to_string()
            }
            RateError::IoError(_) => "Check file paths and permissions".to_string(),
            RateError::ConfigError { .. }
            | RateError::ConfigValidationError { .. }
            | RateError::InvalidConfigValueError { .. }
            | RateError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            _ => "Retry the request; report the issue if it persists".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Invalid request: {}", self),
            ErrorCategory::Provider => format!("Rate provider problem: {}", self),
            ErrorCategory::Unavailable => format!("Exchange rates unavailable: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("Internal error: {}", self),
        }
    }
}

// Request URLs carry the provider access key in the query string.
impl From<reqwest::Error> for RateError {
    fn from(err: reqwest::Error) -> Self {
        RateError::ApiError(err.without_url())
    }
}

pub type Result<T> = std::result::Result<T, RateError>;
