//! Media Server (aria-ms) - Main entry point
//!
//! Serves the music library over HTTP: track listing, tag-derived
//! metadata, and byte-range media streaming with conditional caching.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use aria_common::config::ServerConfig;
use aria_ms::api;
use aria_ms::library::MediaLibrary;
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for aria-ms
#[derive(Parser, Debug)]
#[command(name = "aria-ms")]
#[command(about = "Media server for Aria")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "ARIA_MS_PORT")]
    port: Option<u16>,

    /// Root folder containing music files (overrides config file)
    #[arg(short, long, env = "ARIA_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, env = "ARIA_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aria_ms=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(root_folder) = args.root_folder {
        config.root_folder = root_folder;
    }

    info!("Starting Aria media server on port {}", config.port);
    info!("Music root: {}", config.root_folder.display());

    let library = Arc::new(MediaLibrary::new(config.root_folder.clone()));
    info!("Serving {} music files", library.list_files().len());

    let port = config.port;
    let app_state = api::AppState {
        library,
        config: Arc::new(config),
    };
    let app = api::create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
