use clap::Parser;
use fx_rate_stats::utils::error::ErrorSeverity;
use fx_rate_stats::utils::{logger, validation::Validate};
use fx_rate_stats::{app, CliConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(
        cli.verbose,
        Some(config.logging.level.as_str()),
        config.logging.json,
    );

    tracing::info!("Starting fx-rate-stats");
    if cli.verbose {
        tracing::debug!("Service config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = app::serve(&config).await {
        tracing::error!("❌ Server failed: {:#}", e);

        let exit_code = match e.downcast_ref::<fx_rate_stats::RateError>() {
            Some(rate_error) => match rate_error.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            },
            None => 3,
        };
        eprintln!("❌ {}", e);
        std::process::exit(exit_code);
    }

    Ok(())
}
