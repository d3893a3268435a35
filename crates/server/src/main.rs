//! smallgiants-server entry point.
//!
//! Boots the HTTP service over the Work24 small-giant registry.
//! Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use smallgiants_client::{RegistryService, paginator_from_config};
use smallgiants_core::{AppConfig, TieredCache};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod params;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let config = AppConfig::load().context("failed to load configuration")?;
    if config.require_auth_key().is_err() {
        tracing::warn!("WORK24_AUTH_KEY is not set; listing requests will fail until it is configured");
    }

    let cache = Arc::new(TieredCache::from_config(&config).await);
    let cache_backend = cache.backend_name();
    let paginator = paginator_from_config(&config)?;
    let service = RegistryService::new(paginator, cache, config.cache_scope);

    let bind_addr = config.bind_addr.clone();
    let state = handler::AppState { config: Arc::new(config), service: Arc::new(service), cache_backend };
    let router = handler::build_router(state);

    let listener = TcpListener::bind(bind_addr.as_str()).await.with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, cache = cache_backend, "smallgiants server listening");

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
