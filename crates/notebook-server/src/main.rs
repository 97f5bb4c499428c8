//! Notebook server - serves notes and tags over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use notebook_server::{start_server, ServerConfig, DEFAULT_LOG_FILTER};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(filter: Option<&str>) {
    let env_filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_logging(config.log.as_deref());

    start_server(&config)
        .await
        .with_context(|| format!("Failed to run server on {}:{}", config.host, config.port))
}
