pub mod analyzer;
pub mod service;
pub mod source;

pub use crate::domain::model::{RateReport, RateRequest, ResolvedSeries};
pub use crate::domain::ports::RateStrategy;
pub use crate::utils::error::Result;
