use chrono::NaiveDate;
use fx_rate_stats::app::AppState;
use fx_rate_stats::{
    Breakdown, CurrencyPair, FallbackDataset, FallbackStrategy, LiveSettings, LiveStrategy,
    PctChange, Provenance, RateError, RateRequest, RateService, RateSource, ServiceConfig,
};
use httpmock::prelude::*;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request(start: NaiveDate, end: NaiveDate, from: &str, to: &str) -> RateRequest {
    RateRequest::new(start, end, CurrencyPair::new(from, to).unwrap()).unwrap()
}

fn service_with_live(base_url: String, timeout: Duration) -> RateService {
    let live = LiveStrategy::new(LiveSettings {
        base_url,
        api_key: None,
        timeout,
        day_by_day: false,
    })
    .unwrap();
    let fallback = FallbackStrategy::new(Arc::new(FallbackDataset::bundled().unwrap()));
    RateService::new(RateSource::new(Box::new(live), Box::new(fallback), timeout))
}

#[tokio::test]
async fn test_slow_provider_times_out_to_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/timeframe");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(serde_json::json!({
                    "success": true,
                    "quotes": {
                        "2025-07-01": {"USDEUR": 1.0},
                        "2025-07-02": {"USDEUR": 1.0}
                    }
                }));
        })
        .await;

    let service = service_with_live(server.base_url(), Duration::from_millis(300));
    let report = service
        .run(
            &request(date(2025, 7, 1), date(2025, 7, 2), "USD", "EUR"),
            Breakdown::Day,
        )
        .await
        .unwrap();

    assert_eq!(report.source, Provenance::Fallback);
    assert_eq!(report.totals.start_rate, 0.85234);
    assert_eq!(report.totals.end_rate, 0.85891);
}

#[tokio::test]
async fn test_unreachable_provider_falls_back() {
    // Nothing listens on port 9 on loopback
    let service = service_with_live("http://127.0.0.1:9".to_string(), Duration::from_secs(1));

    let report = service
        .run(
            &request(date(2025, 7, 8), date(2025, 7, 10), "USD", "GBP"),
            Breakdown::Day,
        )
        .await
        .unwrap();

    assert_eq!(report.source, Provenance::Fallback);
    let rates: Vec<f64> = report.breakdown.unwrap().iter().map(|d| d.rate).collect();
    assert_eq!(rates, vec![0.73087, 0.72856, 0.73198]);
}

#[tokio::test]
async fn test_live_failure_outside_window_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/timeframe");
            then.status(200).json_body(serde_json::json!({
                "success": false,
                "error": {"code": 104, "type": "usage_limit_reached"}
            }));
        })
        .await;

    let service = service_with_live(server.base_url(), Duration::from_secs(1));
    let err = service
        .run(
            &request(date(2023, 1, 1), date(2023, 1, 31), "USD", "EUR"),
            Breakdown::None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RateError::SourceUnavailable { .. }));
}

#[tokio::test]
async fn test_custom_fallback_dataset_from_config() {
    let mut dataset_file = NamedTempFile::new().unwrap();
    dataset_file
        .write_all(
            br#"{
                "base": "EUR",
                "rates": {
                    "2024-12-30": {"CHF": 0.0},
                    "2024-12-31": {"CHF": 0.0},
                    "2025-01-01": {"CHF": 0.94}
                }
            }"#,
        )
        .unwrap();

    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        "[provider]\nenabled = false\n\n[fallback]\npath = \"{}\"\n",
        dataset_file.path().display()
    )
    .unwrap();

    let config = ServiceConfig::from_file(config_file.path()).unwrap();
    let state = AppState::from_config(&config).unwrap();
    assert!(!state.service.source().has_live());

    let report = state
        .service
        .run(
            &request(date(2024, 12, 30), date(2025, 1, 2), "eur", "chf"),
            Breakdown::Day,
        )
        .await
        .unwrap();

    let breakdown = report.breakdown.unwrap();
    assert_eq!(breakdown.len(), 4);
    assert_eq!(breakdown[0].pct_change, PctChange::Defined(0.0));
    assert_eq!(breakdown[1].pct_change, PctChange::Defined(0.0));
    assert_eq!(breakdown[2].pct_change, PctChange::Undefined);
    assert_eq!(breakdown[3].pct_change, PctChange::Defined(0.0));
    assert_eq!(report.totals.total_pct_change, PctChange::Undefined);
    assert_eq!(report.totals.mean_rate, 0.47);
    assert_eq!(report.filled_dates, vec![date(2025, 1, 2)]);
}

#[tokio::test]
async fn test_missing_fallback_file_fails_startup() {
    let mut config = ServiceConfig::default();
    config.provider.enabled = false;
    config.fallback.path = Some("/nonexistent/sample_api.json".into());

    assert!(matches!(
        AppState::from_config(&config),
        Err(RateError::IoError(_))
    ));
}

#[tokio::test]
async fn test_series_length_matches_range_for_many_ranges() {
    let dataset = Arc::new(FallbackDataset::bundled().unwrap());
    let service = RateService::new(RateSource::offline(Box::new(FallbackStrategy::new(dataset))));

    for (start, end) in [(1, 1), (1, 10), (5, 20), (10, 10)] {
        let req = request(date(2025, 7, start), date(2025, 7, end), "USD", "EUR");
        let report = service.run(&req, Breakdown::Day).await.unwrap();
        let breakdown = report.breakdown.unwrap();

        assert_eq!(breakdown.len(), (end - start + 1) as usize);
        assert_eq!(breakdown[0].date, req.start());
        assert_eq!(breakdown[breakdown.len() - 1].date, req.end());
        assert!(breakdown.windows(2).all(|w| w[1].date == w[0].date.succ_opt().unwrap()));
        assert_eq!(breakdown[0].pct_change, PctChange::Defined(0.0));
    }
}
