mod config;
mod status;
mod render;
mod api;

use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("homelab_dashboard=info"))
        )
        .init();

    tracing::info!("Starting homelab-dashboard");

    // Load config; problems here are logged and fall back to defaults
    let env = |key: &str| std::env::var(key).ok();
    let config_path = config::resolve_path(std::env::args().nth(1), env);
    let config = Config::load(&config_path, env);

    tracing::info!(
        "Loaded configuration: Port={}, Services={}",
        config.port,
        config.services.len()
    );

    let listen_addr = config.listen_addr();
    let template_paths = render::template::search_paths();
    tracing::debug!("Template search paths: {:?}", template_paths);

    // Build API router
    let app_state = api::routes::AppState::new(config, template_paths);
    let app = api::routes::router(app_state);

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", listen_addr))?;

    tracing::info!("Starting server on {}", listen_addr);

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Run server with graceful shutdown
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    cancel.cancel();

    if let Err(e) = server_handle.await {
        tracing::error!("Server task failed: {}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
