//! The REST surface: router assembly, shared state, and the server loop.

use crate::storage::{CartStorage, OrderStorage, ProductStorage, UserStorage};
use auth::TokenService;
use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use common::config::BackendConfig;
use http::header;
use std::error::Error;
use std::sync::Arc;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod cart;
pub mod error;
pub mod extract;
pub mod orders;
pub mod products;
pub mod users;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStorage>,
    pub products: Arc<dyn ProductStorage>,
    pub cart: Arc<dyn CartStorage>,
    pub orders: Arc<dyn OrderStorage>,
    pub tokens: Arc<TokenService>,
    pub bcrypt_cost: Option<u32>,
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/auth/refresh", post(users::refresh))
        .route("/api/users/{id}/orders", get(orders::past_orders))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/api/products/{id}/orders", get(products::orders_for_product))
        .route("/api/cart", get(cart::get_cart))
        .route("/api/cart/items", post(cart::add_item))
        .route("/api/cart/items/{product_id}", delete(cart::remove_item))
        .route("/api/cart/checkout", post(cart::checkout))
        .route("/api/orders", get(orders::list))
        .route(
            "/api/orders/{id}",
            get(orders::get_by_id).patch(orders::update_address),
        )
        .route("/api/orders/{id}/items", get(orders::items))
        .with_state(state)
}

pub async fn run_server(
    config: BackendConfig,
    state: AppState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<header::HeaderValue>()?)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    info!("Starting backend service at {}", config.server_address);
    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => tracing::warn!("Failed to install signal handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}
