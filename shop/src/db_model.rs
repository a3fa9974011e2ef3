use chrono::{DateTime, Utc, serde::ts_seconds};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type ModelId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: ModelId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a user row. The password arrives here already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbProduct {
    pub id: ModelId,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
}

/// One shopping cart row joined with the current product data.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub product_id: ModelId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// Order row joined with the ordering user's name, for the admin order list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderSummary {
    pub order_id: ModelId,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
    pub total_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderDetails {
    pub order_id: ModelId,
    pub user_id: ModelId,
    pub first_name: String,
    pub last_name: String,
    pub total_price: f64,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
    pub address: String,
}

/// One line of an order joined with the current product name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderLineView {
    pub product_id: ModelId,
    pub name: String,
    pub quantity: i64,
    pub line_total: f64,
}

/// One row of a user's order history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PastOrderRow {
    pub order_id: ModelId,
    pub product_name: String,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
    pub quantity: i64,
    pub line_total: f64,
}

/// One order line that includes a given product, joined with the ordering
/// user, for the admin product report.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductOrderRow {
    pub order_id: ModelId,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "ts_seconds")]
    pub created_at: DateTime<Utc>,
    pub quantity: i64,
    pub line_total: f64,
}
