//! Runtime assembly: pick the backing stores from configuration and wire
//! them into a `StockService`.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use stockpulse_alerting::{InMemoryNotificationStore, NotificationStore, StockService};
use stockpulse_inventory::{InMemoryItemRepository, ItemRepository};

use crate::config::{AppConfig, ENV_DATABASE_URL};
use crate::postgres::{PostgresItemRepository, PostgresNotificationStore};
use crate::schema;

/// The service as assembled at runtime, independent of the backend.
pub type AppService = StockService<Arc<dyn ItemRepository>, Arc<dyn NotificationStore>>;

/// Build the service. Connects to Postgres and ensures the schema when a
/// database URL is configured; otherwise uses the in-memory stores.
pub async fn build(config: &AppConfig) -> anyhow::Result<AppService> {
    let Some(url) = config.database_url.as_deref() else {
        warn!("{ENV_DATABASE_URL} not set; using in-memory stores");
        info!(backend = "memory", "stores ready");
        return Ok(StockService::new(
            InMemoryItemRepository::arc() as Arc<dyn ItemRepository>,
            InMemoryNotificationStore::arc() as Arc<dyn NotificationStore>,
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .context("failed to connect to postgres")?;
    schema::ensure_schema(&pool)
        .await
        .context("failed to ensure database schema")?;

    info!(
        backend = "postgres",
        max_connections = config.max_connections,
        "stores ready"
    );
    Ok(StockService::new(
        Arc::new(PostgresItemRepository::new(pool.clone())) as Arc<dyn ItemRepository>,
        Arc::new(PostgresNotificationStore::new(pool)) as Arc<dyn NotificationStore>,
    ))
}

/// Initialize tracing from `config`, then build the service.
pub async fn start(config: &AppConfig) -> anyhow::Result<AppService> {
    stockpulse_observability::init_with(&config.tracing);
    build(config).await
}
