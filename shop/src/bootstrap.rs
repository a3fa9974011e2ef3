//! Startup plumbing shared by the backend executable: CLI args, config
//! loading, and tracing.

use anyhow::anyhow;
use clap::Parser;
use common::config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,
}

pub fn initialize_executable() -> anyhow::Result<Config> {
    // .env is optional; environment overrides land inside Config::load
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::load(&args.config)
        .map_err(|e| anyhow!("failed to load config from {}: {}", args.config, e))?;

    Ok(config)
}

pub fn initialize_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
