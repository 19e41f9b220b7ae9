//! Feed agent HTTP interception layer.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                  FEED INTERCEPT                  │
//!                       │                                                  │
//!     Client Request    │  ┌────────┐   ┌──────────┐   ┌───────────────┐  │
//!     ──────────────────┼─▶│  http  │──▶│ routing  │──▶│ filter chain  │  │
//!                       │  │ server │   │ contexts │   │  (logging…)   │  │
//!                       │  └────────┘   └──────────┘   └───────┬───────┘  │
//!                       │                                      ▼          │
//!     Client Response   │  ┌────────┐   ┌──────────┐   ┌───────────────┐  │
//!     ◀─────────────────┼──│response│◀──│ decorated│◀──│    handler    │  │
//!                       │  │        │   │  stream  │   │               │  │
//!                       │  └────────┘   └──────────┘   └───────────────┘  │
//!                       │                                                  │
//!                       │  archive (best effort) · observability · config  │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use feed_intercept::config::{load_config, AgentConfig, ObservabilityConfig};
use feed_intercept::http::HttpServer;
use feed_intercept::lifecycle::{check_platform, signals::shutdown_on_signal, Shutdown, StartupError};
use feed_intercept::observability::{init_tracing, metrics};

#[derive(Parser)]
#[command(name = "feed-intercept")]
#[command(about = "HTTP interception layer for the feed agent", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(load_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            init_tracing(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.observability);

    tracing::info!("feed-intercept v{} starting", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AgentConfig) -> Result<(), StartupError> {
    check_platform(&config.platform)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        archive_directory = ?config.archive.directory,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config);
    server.run(listener, shutdown).await?;
    Ok(())
}
