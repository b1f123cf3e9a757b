//! appcycle server
//!
//! Receives signed lifecycle callbacks for one application and answers them.

mod config;
mod error;
mod handler;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use handler::LoggingHandler;
use server::{build_router, run_server};
use shutdown::{shutdown_signal, spawn_config_reload_handler};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// appcycle - lifecycle webhook endpoint
#[derive(Parser, Debug)]
#[command(name = "appcycle-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./appcycle.toml", env = "APPCYCLE_CONFIG")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting appcycle-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.listen;
    tracing::info!(
        app_id = %loaded_config.definition.id,
        check_signatures = loaded_config.dispatcher.check_signatures,
        "Configuration loaded from {:?}",
        args.config
    );
    if loaded_config.dispatcher.log_raw_body {
        tracing::warn!("Raw request bodies are logged at debug level and contain tokens");
    }

    let state = AppState::new(loaded_config, Arc::new(LoggingHandler));

    let shutdown = shutdown_signal().map_err(|e| {
        tracing::error!("Failed to install shutdown signal handlers: {}", e);
        e
    })?;

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader)?;

    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr, shutdown).await;

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
