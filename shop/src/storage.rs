//! Storage seams of the shop backend.
//!
//! Handlers talk to these traits only; the SQLite implementation lives in
//! [`crate::sqlite_storage`]. Mocks are generated for handler unit tests.

use crate::api_model::ProductInput;
use crate::db_model::{
    CartItem, DbProduct, DbUser, ModelId, NewUser, OrderDetails, OrderLineView, OrderSummary,
    PastOrderRow, ProductOrderRow,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("row not found")]
    NotFound,

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("shopping cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Insert a user row; fails with [`StorageError::Duplicate`] when the
    /// email is already taken.
    async fn create_user(&self, user: &NewUser) -> Result<ModelId, StorageError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, StorageError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStorage: Send + Sync {
    /// All products, newest first.
    async fn list_products(&self) -> Result<Vec<DbProduct>, StorageError>;

    async fn get_product(&self, id: ModelId) -> Result<Option<DbProduct>, StorageError>;

    async fn create_product(&self, product: &ProductInput) -> Result<ModelId, StorageError>;

    async fn update_product(&self, id: ModelId, product: &ProductInput)
    -> Result<(), StorageError>;

    async fn delete_product(&self, id: ModelId) -> Result<(), StorageError>;

    /// Every order line that contains the product, joined with the ordering
    /// user's name.
    async fn orders_for_product(&self, id: ModelId)
    -> Result<Vec<ProductOrderRow>, StorageError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartStorage: Send + Sync {
    async fn cart_for_user(&self, user_id: ModelId) -> Result<Vec<CartItem>, StorageError>;

    /// Upsert: a new row, or the quantity added onto an existing one.
    async fn add_to_cart(
        &self,
        user_id: ModelId,
        product_id: ModelId,
        quantity: i64,
    ) -> Result<(), StorageError>;

    async fn remove_from_cart(
        &self,
        user_id: ModelId,
        product_id: ModelId,
    ) -> Result<(), StorageError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStorage: Send + Sync {
    /// The checkout unit of work: create the order row, copy the cart into
    /// order lines priced at checkout time, write the total, clear the cart.
    /// All of it commits or none of it does.
    async fn checkout(&self, user_id: ModelId, address: &str) -> Result<ModelId, StorageError>;

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, StorageError>;

    async fn get_order(&self, id: ModelId) -> Result<Option<OrderDetails>, StorageError>;

    async fn order_lines(&self, id: ModelId) -> Result<Vec<OrderLineView>, StorageError>;

    /// A user's order history, newest order first.
    async fn past_orders_for_user(
        &self,
        user_id: ModelId,
    ) -> Result<Vec<PastOrderRow>, StorageError>;

    async fn update_order_address(&self, id: ModelId, address: &str) -> Result<(), StorageError>;
}
