//! HTTP server initialization and runtime setup.
//!
//! Builds the cache store, upstream client and users service, then runs the
//! Axum server until a shutdown signal arrives.

use crate::application::services::{Aggregator, UsersService};
use crate::config::{CacheBackend, Config};
use crate::infrastructure::cache::{CacheService, MemoryCache, RedisCache};
use crate::infrastructure::upstream::RandomUserClient;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Connects the configured cache backend.
///
/// # Errors
///
/// Returns an error if Redis is selected and cannot be reached. There is no
/// fallback: serving without the store would re-aggregate on every request.
pub async fn connect_cache(config: &Config) -> Result<Arc<dyn CacheService>> {
    let cache: Arc<dyn CacheService> = match config.cache_backend {
        CacheBackend::Redis => {
            let redis = RedisCache::connect(&config.redis_url)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        CacheBackend::Memory => {
            tracing::info!("Cache enabled (in-process memory)");
            Arc::new(MemoryCache::new())
        }
    };

    Ok(cache)
}

/// Wires the cache, upstream client and aggregator into a [`UsersService`].
///
/// # Errors
///
/// Returns an error if the cache cannot be connected or the upstream URL is invalid.
pub async fn build_service(config: &Config) -> Result<(Arc<UsersService>, Arc<dyn CacheService>)> {
    let cache = connect_cache(config).await?;

    let upstream = RandomUserClient::new(&config.upstream_url, config.upstream_timeout())
        .context("Failed to build upstream client")?;
    tracing::info!("Upstream client ready: {:?}", upstream);

    let service = UsersService::new(
        cache.clone(),
        Aggregator::new(Arc::new(upstream)),
        config.dataset_settings(),
    );

    Ok((Arc::new(service), cache))
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Cache connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (users_service, cache) = build_service(&config).await?;

    let state = AppState::new(users_service, cache);
    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
