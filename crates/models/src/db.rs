use std::{env, time::Duration};

use configs::DatabaseConfig;
use once_cell::sync::Lazy;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::ModelError;

/// `DATABASE_URL` from the environment, after loading `.env` if present.
pub static DATABASE_URL: Lazy<Option<String>> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
    env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty())
});

/// Connect using pool settings from configuration. An empty `url` falls back
/// to [`DATABASE_URL`].
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, ModelError> {
    let url = if cfg.url.trim().is_empty() {
        DATABASE_URL.clone().ok_or_else(|| ModelError::invalid("database.url", "is not set"))?
    } else {
        cfg.url.clone()
    };
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    info!(max_connections = cfg.max_connections, min_connections = cfg.min_connections, "database pool ready");
    Ok(db)
}
