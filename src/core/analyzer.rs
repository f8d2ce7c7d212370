use crate::domain::model::{round_pct, round_rate, DayBreakdown, PctChange, RateSeries, Totals};

/// Breakdown and totals for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct RateAnalysis {
    pub breakdown: Vec<DayBreakdown>,
    pub totals: Totals,
}

/// Pure statistics over a [`RateSeries`]. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateAnalyzer;

impl RateAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// A zero base with a zero current rate is no change; a zero base
    /// with a non-zero current rate is [`PctChange::Undefined`].
    pub fn pct_change(prev: f64, curr: f64) -> PctChange {
        if prev == 0.0 {
            return if curr == 0.0 {
                PctChange::Defined(0.0)
            } else {
                PctChange::Undefined
            };
        }
        PctChange::Defined(round_pct((curr - prev) / prev * 100.0))
    }

    pub fn breakdown(&self, series: &RateSeries) -> Vec<DayBreakdown> {
        let mut previous: Option<f64> = None;

        series
            .entries()
            .iter()
            .map(|entry| {
                let pct_change = match previous {
                    Some(prev) => Self::pct_change(prev, entry.rate()),
                    None => PctChange::Defined(0.0),
                };
                previous = Some(entry.rate());

                DayBreakdown {
                    date: entry.date(),
                    rate: entry.rate(),
                    pct_change,
                }
            })
            .collect()
    }

    pub fn totals(&self, series: &RateSeries) -> Totals {
        let start_rate = series.first().rate();
        let end_rate = series.last().rate();
        let sum: f64 = series.rates().sum();
        let mean_rate = round_rate(sum / series.len() as f64);

        Totals {
            start_rate,
            end_rate,
            total_pct_change: Self::pct_change(start_rate, end_rate),
            mean_rate,
        }
    }

    pub fn analyze(&self, series: &RateSeries) -> RateAnalysis {
        RateAnalysis {
            breakdown: self.breakdown(series),
            totals: self.totals(series),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DateRate;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn series(rates: &[f64]) -> RateSeries {
        let entries = rates
            .iter()
            .enumerate()
            .map(|(i, rate)| DateRate::new(date(i as u32 + 1), *rate).unwrap())
            .collect();
        RateSeries::new(date(1), date(rates.len() as u32), entries).unwrap()
    }

    #[test]
    fn test_three_day_scenario() {
        let analysis = RateAnalyzer::new().analyze(&series(&[0.85234, 0.85891, 0.85456]));

        assert_eq!(analysis.breakdown.len(), 3);
        assert_eq!(analysis.breakdown[0].pct_change, PctChange::Defined(0.0));
        assert_eq!(analysis.breakdown[1].pct_change, PctChange::Defined(0.77));
        assert_eq!(analysis.breakdown[2].pct_change, PctChange::Defined(-0.51));

        assert_eq!(analysis.totals.start_rate, 0.85234);
        assert_eq!(analysis.totals.end_rate, 0.85456);
        assert_eq!(analysis.totals.total_pct_change, PctChange::Defined(0.26));
        assert_eq!(analysis.totals.mean_rate, 0.85527);
    }

    #[test]
    fn test_single_day_series() {
        let analysis = RateAnalyzer::new().analyze(&series(&[1.1]));

        assert_eq!(analysis.breakdown.len(), 1);
        assert_eq!(analysis.breakdown[0].pct_change, PctChange::Defined(0.0));
        assert_eq!(analysis.totals.start_rate, analysis.totals.end_rate);
        assert_eq!(analysis.totals.total_pct_change, PctChange::Defined(0.0));
        assert_eq!(analysis.totals.mean_rate, 1.1);
    }

    #[test]
    fn test_zero_base_rates() {
        assert_eq!(RateAnalyzer::pct_change(0.0, 0.0), PctChange::Defined(0.0));
        assert_eq!(RateAnalyzer::pct_change(0.0, 0.5), PctChange::Undefined);

        let analysis = RateAnalyzer::new().analyze(&series(&[0.0, 0.0, 0.9, 0.0]));
        assert_eq!(analysis.breakdown[1].pct_change, PctChange::Defined(0.0));
        assert_eq!(analysis.breakdown[2].pct_change, PctChange::Undefined);
        assert_eq!(analysis.breakdown[3].pct_change, PctChange::Defined(-100.0));
        assert_eq!(analysis.totals.total_pct_change, PctChange::Defined(0.0));
    }

    #[test]
    fn test_total_change_undefined_from_zero_start() {
        let totals = RateAnalyzer::new().totals(&series(&[0.0, 1.2]));
        assert_eq!(totals.total_pct_change, PctChange::Undefined);
        assert_eq!(totals.mean_rate, 0.6);
    }

    #[test]
    fn test_first_breakdown_is_zero_even_after_zero() {
        let breakdown = RateAnalyzer::new().breakdown(&series(&[0.0, 0.0]));
        assert_eq!(breakdown[0].pct_change, PctChange::Defined(0.0));
    }

    #[test]
    fn test_total_change_is_computed_from_rates_not_daily_changes() {
        // each step rounds to 0.00% but the whole move is 0.008%
        let analysis = RateAnalyzer::new().analyze(&series(&[1.0, 1.00004, 1.00008]));
        assert_eq!(analysis.breakdown[1].pct_change, PctChange::Defined(0.0));
        assert_eq!(analysis.breakdown[2].pct_change, PctChange::Defined(0.0));
        assert_eq!(analysis.totals.total_pct_change, PctChange::Defined(0.01));
    }

    #[test]
    fn test_mean_matches_average_within_rate_precision() {
        let rates = [0.91234, 0.91876, 0.90012, 0.93345, 0.92001];
        let totals = RateAnalyzer::new().totals(&series(&rates));
        let average = rates.iter().sum::<f64>() / rates.len() as f64;
        assert!((totals.mean_rate - average).abs() <= 0.000005);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let input = series(&[0.85234, 0.85891, 0.85456, 0.0, 0.86]);
        let analyzer = RateAnalyzer::new();
        assert_eq!(analyzer.analyze(&input), analyzer.analyze(&input));
    }
}
