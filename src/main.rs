//! Storefront - Self-hosted Marketplace Catalog Service

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::storage::PgStore;
use storefront::{AppState, Config, EventPublisher};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to DATABASE_URL")?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let events = EventPublisher::connect(config.nats_url.as_deref()).await;
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    let port = config.port;
    let state = AppState::new(Arc::new(PgStore::new(db)), config, events);
    let app = storefront::app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(%port, "storefront listening on 0.0.0.0:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}
