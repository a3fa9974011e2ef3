use super::AppState;
use super::error::ApiError;
use super::extract::AuthUser;
use crate::api_model::{AddToCartRequest, CheckoutRequest, CheckoutResponse};
use crate::db_model::{CartItem, ModelId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use metrics::{counter, histogram};
use std::time::Instant;
use tracing::info;

pub async fn get_cart(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartItem>>, ApiError> {
    let items = state.cart.cart_for_user(user.user_id).await?;
    Ok(Json(items))
}

pub async fn add_item(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddToCartRequest>,
) -> Result<StatusCode, ApiError> {
    if req.quantity < 1 {
        return Err(ApiError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    state
        .cart
        .add_to_cart(user.user_id, req.product_id, req.quantity)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_item(
    user: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<ModelId>,
) -> Result<StatusCode, ApiError> {
    state.cart.remove_from_cart(user.user_id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn checkout(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    if req.address.trim().is_empty() {
        return Err(ApiError::Validation(
            "delivery address is required".to_string(),
        ));
    }

    let start = Instant::now();
    let order_id = state.orders.checkout(user.user_id, &req.address).await?;

    let h = histogram!("shop_backend_checkout_seconds");
    h.record(start.elapsed().as_secs_f64());
    counter!("shop_backend_orders_total").increment(1);

    info!(user_id = user.user_id, order_id, "checkout completed");
    Ok((StatusCode::CREATED, Json(CheckoutResponse { order_id })))
}
