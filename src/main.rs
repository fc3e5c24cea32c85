#![allow(non_snake_case)]

use std::env;
use std::process::ExitCode;

use clap::Parser;
use rosterBot::cli::{self, Cli};
use rosterBot::config::{AppConfig, BotConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rosterBot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();

    let file_config = match AppConfig::discover(env::var("CONFIG_FILE").ok()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let get_prop = |key: &str| -> Option<String> {
        file_config.get(key).or_else(|| env::var(key).ok())
    };
    let config = match BotConfig::from_lookup(get_prop) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli::cli(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
