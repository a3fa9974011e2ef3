use super::AppState;
use super::error::ApiError;
use super::extract::AdminUser;
use crate::api_model::{IdResponse, ProductInput};
use crate::db_model::{DbProduct, ModelId, ProductOrderRow};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

fn validate(product: &ProductInput) -> Result<(), ApiError> {
    if product.name.trim().is_empty() {
        return Err(ApiError::Validation("product name is required".to_string()));
    }
    if !product.price.is_finite() || product.price < 0.0 {
        return Err(ApiError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<DbProduct>>, ApiError> {
    let products = state.products.list_products().await?;
    Ok(Json(products))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
) -> Result<Json<DbProduct>, ApiError> {
    let product = state
        .products
        .get_product(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(product))
}

pub async fn create(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ProductInput>,
) -> Result<(StatusCode, Json<IdResponse>), ApiError> {
    validate(&req)?;

    let id = state.products.create_product(&req).await?;
    info!(product_id = id, "created product '{}'", req.name);

    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
    Json(req): Json<ProductInput>,
) -> Result<StatusCode, ApiError> {
    validate(&req)?;

    state.products.update_product(id, &req).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
) -> Result<StatusCode, ApiError> {
    state.products.delete_product(id).await?;
    info!(product_id = id, "deleted product");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn orders_for_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
) -> Result<Json<Vec<ProductOrderRow>>, ApiError> {
    let rows = state.products.orders_for_product(id).await?;
    Ok(Json(rows))
}
