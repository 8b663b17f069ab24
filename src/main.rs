//! # Gateway Main Driver
//!
//! ## Purpose
//! Entry point for the portfolio API gateway. Loads configuration, wires up
//! the repository cache service and the chat relay, and runs the web server
//! until a shutdown signal arrives.
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Construct the upstream clients and shared state
//! 4. Start the web API server
//! 5. Handle shutdown signals gracefully

use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use portfolio_gateway::{
    api::ApiServer,
    chat::ChatRelay,
    config::Config,
    errors::{GatewayError, Result},
    repos::RepoService,
    AppState,
};

/// Backend gateway for repository listings and assistant chat streaming
#[derive(Parser)]
#[command(name = "gateway-server", version, about)]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: String,

    /// Server port (overrides the configuration file)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_file(&args.config)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let config = Arc::new(config);

    // Initialize logging
    init_logging(&config)?;

    info!("Starting portfolio gateway");
    if std::path::Path::new(&args.config).exists() {
        info!("Configuration loaded from: {}", args.config);
    } else {
        warn!(
            "Configuration file not found: {}, using defaults",
            args.config
        );
    }

    if config.chat.api_key.is_none() {
        warn!("Chat credential is not set; /api/chat will respond 503");
    }

    // Initialize application components
    let app_state = AppState {
        repos: Arc::new(RepoService::new(config.github.clone())?),
        chat: Arc::new(ChatRelay::new(config.chat.clone())?),
        config: config.clone(),
    };

    // Start the API server
    let server = ApiServer::new(app_state);

    info!(
        "Gateway started on {}:{}",
        config.server.host, config.server.port
    );

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Gateway shut down");
    Ok(())
}

/// Initialize logging and tracing from the configuration
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.logging.level).map_err(|_| GatewayError::Config {
        message: format!("Invalid log level: {}", config.logging.level),
    })?;

    if config.logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    Ok(())
}
