//! SQLite implementation of the storage traits, over an sqlx pool.

use crate::api_model::ProductInput;
use crate::db_model::{
    CartItem, DbProduct, DbUser, ModelId, NewUser, OrderDetails, OrderLineView, OrderSummary,
    PastOrderRow, ProductOrderRow,
};
use crate::storage::{CartStorage, OrderStorage, ProductStorage, StorageError, UserStorage};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, error, info};

pub struct ShopStorage {
    pub pool: SqlitePool,
}

impl ShopStorage {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn initialize_schema(&self) -> Result<(), StorageError> {
        let init_sql = include_str!("../resources/schema.sql");
        sqlx::raw_sql(init_sql).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStorage for ShopStorage {
    async fn create_user(&self, user: &NewUser) -> Result<ModelId, StorageError> {
        debug!("Checking whether a user already exists for {}", user.email);
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ? LIMIT 1")
            .bind(&user.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(StorageError::Duplicate("user".to_string()));
        }

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, password_hash, is_admin, first_name, last_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Two concurrent registrations can both pass the existence check;
            // the unique index settles it.
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                StorageError::Duplicate("user".to_string())
            } else {
                error!("Failed to insert user: {}", e);
                StorageError::Db(e)
            }
        })?;

        debug!("Inserted user {} with id {}", user.email, id);
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, StorageError> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, email, password_hash, is_admin, first_name, last_name, created_at
            FROM users
            WHERE email = ?
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl ProductStorage for ShopStorage {
    async fn list_products(&self) -> Result<Vec<DbProduct>, StorageError> {
        let products = sqlx::query_as::<_, DbProduct>(
            r#"
            SELECT id, name, price, description, created_at
            FROM products
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("list_products -> {} rows", products.len());
        Ok(products)
    }

    async fn get_product(&self, id: ModelId) -> Result<Option<DbProduct>, StorageError> {
        let product = sqlx::query_as::<_, DbProduct>(
            "SELECT id, name, price, description, created_at FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn create_product(&self, product: &ProductInput) -> Result<ModelId, StorageError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO products (name, price, description, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!("Inserted product '{}' with id {}", product.name, id);
        Ok(id)
    }

    async fn update_product(
        &self,
        id: ModelId,
        product: &ProductInput,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE products SET name = ?, price = ?, description = ? WHERE id = ?")
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_product(&self, id: ModelId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn orders_for_product(
        &self,
        id: ModelId,
    ) -> Result<Vec<ProductOrderRow>, StorageError> {
        let rows = sqlx::query_as::<_, ProductOrderRow>(
            r#"
            SELECT o.id AS order_id, u.first_name, u.last_name, o.created_at,
                   oi.quantity, oi.line_total
            FROM users u
            JOIN orders o ON u.id = o.user_id
            JOIN order_items oi ON o.id = oi.order_id
            WHERE oi.product_id = ?
            ORDER BY o.id DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl CartStorage for ShopStorage {
    async fn cart_for_user(&self, user_id: ModelId) -> Result<Vec<CartItem>, StorageError> {
        let items = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT c.product_id, p.name, p.price, c.quantity
            FROM cart_items c
            JOIN products p ON c.product_id = p.id
            WHERE c.user_id = ?
            ORDER BY p.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        debug!("cart_for_user({}) -> {} items", user_id, items.len());
        Ok(items)
    }

    async fn add_to_cart(
        &self,
        user_id: ModelId,
        product_id: ModelId,
        quantity: i64,
    ) -> Result<(), StorageError> {
        let known = sqlx::query_scalar::<_, i64>("SELECT id FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        if known.is_none() {
            return Err(StorageError::NotFound);
        }

        sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = quantity + excluded.quantity
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(
            "add_to_cart user={} product={} quantity={}",
            user_id, product_id, quantity
        );
        Ok(())
    }

    async fn remove_from_cart(
        &self,
        user_id: ModelId,
        product_id: ModelId,
    ) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE product_id = ? AND user_id = ?")
            .bind(product_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStorage for ShopStorage {
    async fn checkout(&self, user_id: ModelId, address: &str) -> Result<ModelId, StorageError> {
        debug!("Starting checkout transaction for user {}", user_id);

        let mut tx = self.pool.begin().await?;

        let cart_rows = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cart_items WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if cart_rows == 0 {
            // Transaction rolls back on drop.
            return Err(StorageError::EmptyCart);
        }

        let now = Utc::now();

        // 1. Order row with a zero placeholder total
        let order_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO orders (user_id, address, total_price, created_at)
            VALUES (?, ?, 0, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(address)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        // 2. Copy cart rows into order lines, priced at checkout time
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, line_total, created_at)
            SELECT ?, c.product_id, c.quantity, p.price * c.quantity, ?
            FROM cart_items c
            JOIN products p ON c.product_id = p.id
            WHERE c.user_id = ?
            "#,
        )
        .bind(order_id)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        // 3. Write the order total from its lines
        sqlx::query(
            r#"
            UPDATE orders
            SET total_price = (SELECT COALESCE(SUM(line_total), 0) FROM order_items WHERE order_id = ?)
            WHERE id = ?
            "#,
        )
        .bind(order_id)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        // 4. Clear the cart
        sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        match tx.commit().await {
            Ok(_) => debug!("Checkout committed, order {}", order_id),
            Err(e) => {
                error!("Failed to commit checkout for user {}: {}", user_id, e);
                return Err(e.into());
            }
        }

        info!("Created order {} for user {}", order_id, user_id);
        Ok(order_id)
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, StorageError> {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id AS order_id, u.first_name, u.last_name, o.created_at, o.total_price
            FROM orders o
            JOIN users u ON o.user_id = u.id
            ORDER BY o.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    async fn get_order(&self, id: ModelId) -> Result<Option<OrderDetails>, StorageError> {
        let order = sqlx::query_as::<_, OrderDetails>(
            r#"
            SELECT o.id AS order_id, o.user_id, u.first_name, u.last_name,
                   o.total_price, o.created_at, o.address
            FROM orders o
            JOIN users u ON o.user_id = u.id
            WHERE o.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn order_lines(&self, id: ModelId) -> Result<Vec<OrderLineView>, StorageError> {
        let lines = sqlx::query_as::<_, OrderLineView>(
            r#"
            SELECT oi.product_id, COALESCE(p.name, '(removed)') AS name,
                   oi.quantity, oi.line_total
            FROM order_items oi
            LEFT JOIN products p ON oi.product_id = p.id
            WHERE oi.order_id = ?
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    async fn past_orders_for_user(
        &self,
        user_id: ModelId,
    ) -> Result<Vec<PastOrderRow>, StorageError> {
        let rows = sqlx::query_as::<_, PastOrderRow>(
            r#"
            SELECT o.id AS order_id, COALESCE(p.name, '(removed)') AS product_name,
                   o.created_at, oi.quantity, oi.line_total
            FROM orders o
            JOIN order_items oi ON o.id = oi.order_id
            LEFT JOIN products p ON oi.product_id = p.id
            WHERE o.user_id = ?
            ORDER BY o.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update_order_address(&self, id: ModelId, address: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE orders SET address = ? WHERE id = ?")
            .bind(address)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
