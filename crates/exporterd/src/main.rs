//! exporterd — the RCON status exporter daemon.
//!
//! Assembles the exporter:
//! - Environment configuration (optionally from a `.env` file)
//! - RCON client
//! - Gauge registry + status board
//! - Scrape loop
//! - Prometheus pull endpoint
//!
//! # Usage
//!
//! ```text
//! SCRAPE_INTERVAL_S=15 FACTORIO_RCON_HOST=127.0.0.1 FACTORIO_RCON_PORT=27015 \
//!   FACTORIO_RCON_PASSWORD=... exporterd
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use exporter_core::ExporterConfig;
use exporter_metrics::{ExporterMetrics, Scraper, StatusBoard};
use exporter_rcon::RconClient;

#[derive(Parser)]
#[command(name = "exporterd", about = "Game server RCON status exporter")]
struct Cli {
    /// Environment file loaded before reading configuration.
    /// Variables already set in the environment take precedence.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,exporterd=debug,exporter_metrics=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match dotenvy::from_path(&cli.env_file) {
        Ok(()) => info!(path = ?cli.env_file, "environment file loaded"),
        Err(e) if e.not_found() => debug!(path = ?cli.env_file, "no environment file"),
        Err(e) => warn!(path = ?cli.env_file, error = %e, "failed to load environment file"),
    }

    let config = match ExporterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(variable = e.variable(), error = %e, "invalid configuration");
            error!("cannot proceed without RCON access to the game server, quitting");
            std::process::exit(1);
        }
    };

    run(config).await
}

async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    // ── Initialize subsystems ──────────────────────────────────

    let metrics = ExporterMetrics::new(env!("CARGO_PKG_VERSION"))?;
    let board = StatusBoard::new();

    let client = RconClient::new(
        config.rcon.address(),
        config.rcon.password.clone(),
        config.rcon.timeout,
    );
    let scraper = Arc::new(Scraper::new(
        client,
        metrics.clone(),
        board.clone(),
        config.scrape_interval,
    ));

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start API server ───────────────────────────────────────

    let router = exporter_metrics::build_router(metrics, board);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.exporter_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        %addr,
        interval_secs = config.scrape_interval.as_secs(),
        rcon = %config.rcon.address(),
        "exporter running"
    );

    // ── Start scrape loop ──────────────────────────────────────

    let scrape_handle = tokio::spawn(async move {
        scraper.run(shutdown_rx).await;
    });

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    let _ = scrape_handle.await;

    info!("exporter stopped");
    Ok(())
}
