use super::AppState;
use super::error::ApiError;
use super::extract::{AdminUser, AuthUser};
use crate::api_model::UpdateOrderRequest;
use crate::db_model::{ModelId, OrderDetails, OrderLineView, OrderSummary, PastOrderRow};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

pub async fn list(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(orders))
}

pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
) -> Result<Json<OrderDetails>, ApiError> {
    let order = state.orders.get_order(id).await?.ok_or(ApiError::NotFound)?;

    if !user.is_admin && order.user_id != user.user_id {
        return Err(ApiError::Forbidden);
    }

    Ok(Json(order))
}

pub async fn items(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
) -> Result<Json<Vec<OrderLineView>>, ApiError> {
    let order = state.orders.get_order(id).await?.ok_or(ApiError::NotFound)?;
    if !user.is_admin && order.user_id != user.user_id {
        return Err(ApiError::Forbidden);
    }

    let lines = state.orders.order_lines(id).await?;
    Ok(Json(lines))
}

pub async fn update_address(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<StatusCode, ApiError> {
    if req.address.trim().is_empty() {
        return Err(ApiError::Validation(
            "delivery address is required".to_string(),
        ));
    }

    state.orders.update_order_address(id, &req.address).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn past_orders(
    user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<ModelId>,
) -> Result<Json<Vec<PastOrderRow>>, ApiError> {
    if !user.is_admin && user.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    let rows = state.orders.past_orders_for_user(user_id).await?;
    Ok(Json(rows))
}
