use anyhow::Context;
use marquee_api::{app, AppState};
use marquee_store::app_config::Config;
use marquee_store::{DbClient, PostgresCatalogRepository, PostgresSeatRepository, RedisClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "marquee_api=debug,marquee_booking=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let redis = RedisClient::new(&config.redis.url)
        .await
        .context("Invalid Redis URL")?;
    // Reads degrade to the store without a cache, so only warn here.
    if let Err(e) = redis.ping().await {
        tracing::warn!("Redis not reachable at startup: {}", e);
    }

    let state = AppState::new(
        Arc::new(PostgresSeatRepository::new(db.pool.clone())),
        Arc::new(redis),
        Arc::new(PostgresCatalogRepository::new(db.pool.clone())),
        config.cache.policy(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
