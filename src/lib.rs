pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FallbackDataset, FallbackStrategy, LiveSettings, LiveStrategy};
pub use config::ServiceConfig;
pub use crate::core::{analyzer::RateAnalyzer, service::RateService, source::RateSource};
pub use domain::model::{
    Breakdown, CurrencyPair, DateRate, DayBreakdown, PctChange, Provenance, RateReport,
    RateRequest, RateSeries, ResolvedSeries, Totals,
};
pub use utils::error::{RateError, Result};
