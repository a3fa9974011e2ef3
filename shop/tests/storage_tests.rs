// Storage layer tests for users, products, and the shopping cart.
//
// All tests run against a private in-memory SQLite database, so they are
// safe to execute in parallel.

use common::test_helpers::{create_test_pool, generate_unique_id};
use shop::api_model::ProductInput;
use shop::db_model::NewUser;
use shop::sqlite_storage::ShopStorage;
use shop::storage::{CartStorage, ProductStorage, StorageError, UserStorage};
use std::error::Error;

async fn test_storage() -> ShopStorage {
    let storage = ShopStorage::from_pool(create_test_pool().await);
    storage.initialize_schema().await.expect("schema");
    storage
}

fn test_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "$2b$04$fakehashfakehashfakehash".to_string(),
        is_admin: false,
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
    }
}

fn test_product(name: &str, price: f64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        price,
        description: Some(format!("{} description", name)),
    }
}

#[tokio::test]
async fn create_user_and_find_by_email() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let email = format!("{}@test.com", generate_unique_id("REG").to_lowercase());

    let id = storage.create_user(&test_user(&email)).await?;
    assert!(id > 0);

    let found = storage.find_by_email(&email).await?.expect("user exists");
    assert_eq!(found.id, id);
    assert_eq!(found.email, email);
    assert_eq!(found.first_name, "Jane");
    assert!(!found.is_admin);

    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let email = "dup@test.com";

    storage.create_user(&test_user(email)).await?;
    let result = storage.create_user(&test_user(email)).await;

    assert!(matches!(result, Err(StorageError::Duplicate(_))));
    Ok(())
}

#[tokio::test]
async fn unknown_email_is_none() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    assert!(storage.find_by_email("missing@test.com").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn product_crud_roundtrip() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;

    let id = storage.create_product(&test_product("Keyboard", 49.5)).await?;

    let product = storage.get_product(id).await?.expect("product exists");
    assert_eq!(product.name, "Keyboard");
    assert_eq!(product.price, 49.5);
    assert_eq!(product.description.as_deref(), Some("Keyboard description"));

    storage
        .update_product(id, &test_product("Mechanical Keyboard", 59.0))
        .await?;
    let updated = storage.get_product(id).await?.expect("product exists");
    assert_eq!(updated.name, "Mechanical Keyboard");
    assert_eq!(updated.price, 59.0);

    storage.delete_product(id).await?;
    assert!(storage.get_product(id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn update_missing_product_is_not_found() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;

    let result = storage.update_product(4242, &test_product("Ghost", 1.0)).await;
    assert!(matches!(result, Err(StorageError::NotFound)));

    let result = storage.delete_product(4242).await;
    assert!(matches!(result, Err(StorageError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn list_products_newest_first() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;

    storage.create_product(&test_product("First", 1.0)).await?;
    storage.create_product(&test_product("Second", 2.0)).await?;

    let products = storage.list_products().await?;
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Second");
    assert_eq!(products[1].name, "First");

    Ok(())
}

#[tokio::test]
async fn add_to_cart_merges_quantities() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = storage.create_user(&test_user("cart@test.com")).await?;
    let product_id = storage.create_product(&test_product("Mug", 8.5)).await?;

    storage.add_to_cart(user_id, product_id, 2).await?;
    storage.add_to_cart(user_id, product_id, 3).await?;

    let cart = storage.cart_for_user(user_id).await?;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].product_id, product_id);
    assert_eq!(cart[0].quantity, 5);
    assert_eq!(cart[0].name, "Mug");
    assert_eq!(cart[0].price, 8.5);

    Ok(())
}

#[tokio::test]
async fn add_unknown_product_is_not_found() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = storage.create_user(&test_user("ghost@test.com")).await?;

    let result = storage.add_to_cart(user_id, 999, 1).await;
    assert!(matches!(result, Err(StorageError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn remove_from_cart_deletes_the_row() -> Result<(), Box<dyn Error + Send + Sync>> {
    let storage = test_storage().await;
    let user_id = storage.create_user(&test_user("remove@test.com")).await?;
    let product_id = storage.create_product(&test_product("Poster", 3.0)).await?;

    storage.add_to_cart(user_id, product_id, 1).await?;
    storage.remove_from_cart(user_id, product_id).await?;

    assert!(storage.cart_for_user(user_id).await?.is_empty());

    // Removing again reports the missing row
    let result = storage.remove_from_cart(user_id, product_id).await;
    assert!(matches!(result, Err(StorageError::NotFound)));

    Ok(())
}
