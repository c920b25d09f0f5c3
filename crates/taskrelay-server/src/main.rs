//! TaskRelay Server

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskrelay_server::{http, AppState, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskrelay=info,tower_http=info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;
    let http_addr: SocketAddr = config.http_addr.parse()?;

    let state = AppState::from_config(&config);
    let router = http::create_router(state.clone());

    info!(
        http_addr = %http_addr,
        connector_url = %config.connector_url,
        max_body_bytes = config.max_body_bytes,
        "Starting TaskRelay server"
    );

    let listener = TcpListener::bind(http_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let in_flight = state.scheduler.in_flight().await;
    info!(in_flight, "HTTP server stopped, waiting for in-flight runs");
    state.scheduler.drain().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
