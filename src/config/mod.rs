pub mod toml_config;

pub use toml_config::ServiceConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "fx-rate-stats")]
#[command(about = "Exchange-rate statistics over HTTP with local fallback data")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    #[arg(long, help = "Serve from the fallback dataset only")]
    pub offline: bool,

    #[arg(long, help = "Path to a fallback dataset JSON file")]
    pub fallback: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the file named by `--config` (defaults otherwise) and applies flag overrides.
    pub fn load(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.offline {
            config.provider.enabled = false;
        }
        if let Some(path) = &self.fallback {
            config.fallback.path = Some(path.into());
        }
        if self.json_logs {
            config.logging.json = true;
        }

        Ok(config)
    }
}
