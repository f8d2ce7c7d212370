use clap::Parser;
use fx_rate_stats::app::routes::{DEFAULT_FROM, DEFAULT_TO};
use fx_rate_stats::app::AppState;
use fx_rate_stats::utils::error::ErrorSeverity;
use fx_rate_stats::utils::validation::{parse_date, validate_currency_code, Validate};
use fx_rate_stats::utils::logger;
use fx_rate_stats::{Breakdown, CurrencyPair, RateRequest, Result, ServiceConfig};

#[derive(Parser)]
#[command(name = "rate-report")]
#[command(about = "Print exchange-rate statistics for a date range as JSON")]
struct Args {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: String,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end: String,

    #[arg(long, default_value = DEFAULT_FROM)]
    from: String,

    #[arg(long, default_value = DEFAULT_TO)]
    to: String,

    /// 'day' or 'none'
    #[arg(long, default_value = "day")]
    breakdown: String,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Skip the live provider
    #[arg(long)]
    offline: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

async fn run(args: &Args) -> Result<String> {
    let mut config = match &args.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if args.offline {
        config.provider.enabled = false;
    }
    config.validate()?;

    let start = parse_date("start", &args.start)?;
    let end = parse_date("end", &args.end)?;
    let from = validate_currency_code("from", &args.from)?;
    let to = validate_currency_code("to", &args.to)?;
    let breakdown: Breakdown = args.breakdown.parse()?;
    let request = RateRequest::new(start, end, CurrencyPair::new(&from, &to)?)?;

    let state = AppState::from_config(&config)?;
    let report = state.service.run(&request, breakdown).await?;

    Ok(serde_json::to_string_pretty(&report)?)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    match run(&args).await {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(
                "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}
