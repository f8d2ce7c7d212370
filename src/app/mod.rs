pub mod response;
pub mod routes;

use crate::adapters::{FallbackDataset, FallbackStrategy, LiveStrategy};
use crate::config::ServiceConfig;
use crate::core::service::RateService;
use crate::core::source::RateSource;
use crate::utils::error::Result;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const SERVICE_NAME: &str = "Exchange Rate API";

pub struct AppState {
    pub service: RateService,
    pub service_name: &'static str,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(service: RateService) -> Self {
        Self {
            service,
            service_name: SERVICE_NAME,
        }
    }

    /// Loads the fallback dataset once and wires both strategies.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let dataset = match &config.fallback.path {
            Some(path) => {
                tracing::info!("Loading fallback dataset from {}", path.display());
                FallbackDataset::from_file(path)?
            }
            None => FallbackDataset::bundled()?,
        };
        tracing::info!(
            "Fallback dataset: base {} quotes [{}]",
            dataset.base(),
            dataset.quote_currencies().join(", ")
        );
        let fallback = Box::new(FallbackStrategy::new(Arc::new(dataset)));

        let source = if config.provider.enabled {
            let live = LiveStrategy::new(config.provider.live_settings())?;
            tracing::info!(
                "Live provider {} (timeout {}s)",
                config.provider.base_url,
                config.provider.timeout_seconds
            );
            RateSource::new(Box::new(live), fallback, config.provider.timeout())
        } else {
            tracing::info!("Live provider disabled, serving fallback data only");
            RateSource::offline(fallback)
        };

        let service = RateService::new(source).with_max_range_days(config.server.max_range_days);
        Ok(Self::new(service))
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/finance", get(routes::finance))
        .route("/api/rates", get(routes::chart_rates))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(config: &ServiceConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let app = router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("🚀 Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
