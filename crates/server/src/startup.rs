use std::future::Future;

use configs::AppConfig;
use dotenvy::dotenv;
use service::{gateway, seed::seed_demo_data, Catalog};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load `.env`, then `config.toml` (or `CONFIG_PATH`), falling back to environment variables.
pub fn load_config() -> Result<AppConfig, StartupError> {
    dotenv().ok();
    AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

/// Open the configured store and, if enabled, load the demo catalogue.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let repos = gateway::connect(&cfg.database).await?;
    let catalog = Catalog::new(repos);
    if cfg.seed.enabled {
        // A failed seed leaves the service usable
        if let Err(e) = seed_demo_data(&catalog).await {
            warn!(error = %e, "seeding demo data failed");
        }
    }
    Ok(AppState::new(catalog))
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Build the app and serve HTTP until `shutdown` resolves.
pub async fn serve<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg).await?;
    let app = routes::build_router(state, build_cors());

    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .map_err(|source| StartupError::Bind { addr: format!("{}:{}", cfg.server.host, cfg.server.port), source })?;
    let addr = listener.local_addr()?;
    info!(%addr, backend = ?cfg.database.backend, "starting inventory server");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("http server drained");
    Ok(())
}
