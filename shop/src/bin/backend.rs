use std::sync::Arc;

use anyhow::anyhow;
use auth::TokenService;
use metrics_exporter_prometheus::PrometheusBuilder;
use shop::bootstrap::{initialize_executable, initialize_tracing};
use shop::http::{AppState, run_server};
use shop::sqlite_storage::ShopStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = initialize_executable()?;
    initialize_tracing(&config.backend.log_level);

    if let Err(e) = PrometheusBuilder::new().install() {
        tracing::warn!("metrics exporter not started: {e}");
    }

    let storage = Arc::new(ShopStorage::new(&config.common.database_url).await?);
    storage.initialize_schema().await?;

    let tokens = Arc::new(TokenService::new(
        &config.auth.access_secret,
        &config.auth.refresh_secret,
        config.auth.access_ttl_secs,
        config.auth.refresh_ttl_secs,
    ));

    let state = AppState {
        users: storage.clone(),
        products: storage.clone(),
        cart: storage.clone(),
        orders: storage,
        tokens,
        bcrypt_cost: config.auth.bcrypt_cost,
    };

    run_server(config.backend, state).await.map_err(|e| anyhow!(e))
}
