// Checkout and order history tests.
//
// Checkout is a single transaction: create the order, copy the cart into
// order lines priced at the current product price, roll the line totals
// up into the order total, and clear the cart. These tests pin that
// behavior down against an in-memory SQLite database.

use common::test_helpers::create_test_pool;
use shop::api_model::ProductInput;
use shop::db_model::NewUser;
use shop::sqlite_storage::ShopStorage;
use shop::storage::{CartStorage, OrderStorage, ProductStorage, StorageError, UserStorage};
use std::error::Error;

async fn test_storage() -> ShopStorage {
    let storage = ShopStorage::from_pool(create_test_pool().await);
    storage.initialize_schema().await.expect("schema");
    storage
}

fn product(name: &str, price: f64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        price,
        description: None,
    }
}

async fn seed_user(storage: &ShopStorage, email: &str) -> i64 {
    storage
        .create_user(&NewUser {
            email: email.to_string(),
            password_hash: "$2b$04$fakehashfakehashfakehash".to_string(),
            is_admin: false,
            first_name: "Olga".to_string(),
            last_name: "Ivanova".to_string(),
        })
        .await
        .expect("user")
}

#[tokio::test]
async fn checkout_moves_cart_into_order() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = seed_user(&storage, "buyer@test.com").await;
    let shirt = storage.create_product(&product("Shirt", 10.0)).await?;
    let socks = storage.create_product(&product("Socks", 4.5)).await?;

    storage.add_to_cart(user_id, shirt, 2).await?;
    storage.add_to_cart(user_id, socks, 3).await?;

    let order_id = storage.checkout(user_id, "12 Main St").await?;

    let order = storage.get_order(order_id).await?.expect("order exists");
    assert_eq!(order.user_id, user_id);
    assert_eq!(order.address, "12 Main St");
    assert_eq!(order.total_price, 2.0 * 10.0 + 3.0 * 4.5);

    let lines = storage.order_lines(order_id).await?;
    assert_eq!(lines.len(), 2);
    let shirt_line = lines.iter().find(|l| l.product_id == shirt).expect("shirt line");
    assert_eq!(shirt_line.name, "Shirt");
    assert_eq!(shirt_line.quantity, 2);
    assert_eq!(shirt_line.line_total, 20.0);

    // The cart is emptied in the same transaction
    assert!(storage.cart_for_user(user_id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn checkout_with_empty_cart_is_rejected() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = seed_user(&storage, "empty@test.com").await;

    let result = storage.checkout(user_id, "Nowhere 1").await;
    assert!(matches!(result, Err(StorageError::EmptyCart)));

    // No order row was left behind
    assert!(storage.list_orders().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn checkout_prices_at_checkout_time() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = seed_user(&storage, "repricing@test.com").await;
    let lamp = storage.create_product(&product("Lamp", 20.0)).await?;

    storage.add_to_cart(user_id, lamp, 1).await?;
    storage.update_product(lamp, &product("Lamp", 12.0)).await?;

    let order_id = storage.checkout(user_id, "3 Side St").await?;
    let order = storage.get_order(order_id).await?.expect("order exists");
    assert_eq!(order.total_price, 12.0);

    Ok(())
}

#[tokio::test]
async fn past_orders_are_newest_first() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = seed_user(&storage, "history@test.com").await;
    let pen = storage.create_product(&product("Pen", 2.0)).await?;

    storage.add_to_cart(user_id, pen, 1).await?;
    let first = storage.checkout(user_id, "First order").await?;

    storage.add_to_cart(user_id, pen, 4).await?;
    let second = storage.checkout(user_id, "Second order").await?;

    let history = storage.past_orders_for_user(user_id).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].order_id, second);
    assert_eq!(history[1].order_id, first);
    assert_eq!(history[0].line_total, 8.0);
    assert_eq!(history[0].product_name, "Pen");

    Ok(())
}

#[tokio::test]
async fn orders_for_product_lists_buyers() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = seed_user(&storage, "olga@test.com").await;
    let book = storage.create_product(&product("Book", 15.0)).await?;

    storage.add_to_cart(user_id, book, 2).await?;
    storage.checkout(user_id, "7 Library Rd").await?;

    let buyers = storage.orders_for_product(book).await?;
    assert_eq!(buyers.len(), 1);
    assert_eq!(buyers[0].first_name, "Olga");
    assert_eq!(buyers[0].last_name, "Ivanova");
    assert_eq!(buyers[0].quantity, 2);

    Ok(())
}

#[tokio::test]
async fn list_orders_returns_summaries() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = seed_user(&storage, "summary@test.com").await;
    let cup = storage.create_product(&product("Cup", 5.0)).await?;

    storage.add_to_cart(user_id, cup, 2).await?;
    let order_id = storage.checkout(user_id, "9 Short Ln").await?;

    let orders = storage.list_orders().await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, order_id);
    assert_eq!(orders[0].first_name, "Olga");
    assert_eq!(orders[0].total_price, 10.0);

    Ok(())
}

#[tokio::test]
async fn update_order_address() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = seed_user(&storage, "move@test.com").await;
    let hat = storage.create_product(&product("Hat", 9.0)).await?;

    storage.add_to_cart(user_id, hat, 1).await?;
    let order_id = storage.checkout(user_id, "Old address").await?;

    storage.update_order_address(order_id, "New address").await?;
    let order = storage.get_order(order_id).await?.expect("order exists");
    assert_eq!(order.address, "New address");

    let result = storage.update_order_address(4242, "Nowhere").await;
    assert!(matches!(result, Err(StorageError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn order_lines_survive_product_deletion() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = seed_user(&storage, "archive@test.com").await;
    let retired = storage.create_product(&product("Retired", 30.0)).await?;

    storage.add_to_cart(user_id, retired, 1).await?;
    let order_id = storage.checkout(user_id, "2 Past Ave").await?;

    storage.delete_product(retired).await?;

    let lines = storage.order_lines(order_id).await?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].line_total, 30.0);

    Ok(())
}
