#![cfg(test)]
use std::sync::Arc;

use configs::{DatabaseBackend, DatabaseConfig};
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use crate::catalog::Catalog;
use crate::gateway::Repositories;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn postgres_config() -> Option<DatabaseConfig> {
    let url = models::db::DATABASE_URL.clone()?;
    Some(DatabaseConfig {
        backend: DatabaseBackend::Postgres,
        url,
        max_connections: 5,
        min_connections: 1,
        acquire_timeout_secs: 10,
        ..DatabaseConfig::default()
    })
}

/// Connection to the test database, or `None` when `DATABASE_URL` is unset.
pub async fn postgres_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    let Some(cfg) = postgres_config() else { return Ok(None) };
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect_with_config(&cfg).await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<_, anyhow::Error>(())
        })
        .await?;
    // Fresh connection for the current test's runtime
    Ok(Some(connect_with_config(&cfg).await?))
}

pub fn memory_catalog() -> Catalog { Catalog::new(Repositories::in_memory()) }

pub fn shared_memory_catalog() -> Arc<Catalog> { Arc::new(memory_catalog()) }
