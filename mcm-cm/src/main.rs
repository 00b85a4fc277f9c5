//! mcm-cm (Museum Content Manager) - Admin API for the exhibit tree
//!
//! Stores the Museum → Room → Artifact hierarchy with reusable content
//! items, and materializes declarative outlines into ordered placements.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;

use mcm_cm::{build_router, AppState};

/// Command-line arguments for mcm-cm
#[derive(Parser, Debug)]
#[command(name = "mcm-cm")]
#[command(about = "Museum Content Manager service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "MCM_PORT")]
    port: u16,

    /// Root folder containing the museum database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting MCM Content Manager (mcm-cm) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder =
        mcm_common::config::resolve_root_folder(args.root_folder.as_deref(), "MCM_ROOT_FOLDER")
            .context("Failed to resolve root folder")?;
    mcm_common::config::ensure_root_folder(&root_folder)?;

    let db_path = mcm_common::config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = mcm_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    // Create application state and router
    let state = AppState::new(pool);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("mcm-cm listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
