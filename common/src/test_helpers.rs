//! Shared test helpers for cross-crate use.
//!
//! Centralized test utilities used by the `auth` and `shop` test suites to
//! avoid duplicating database bootstrapping and id generation.

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// Global counter for truly unique test identifiers across parallel tests
static GLOBAL_TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate globally unique test identifiers that won't conflict across
/// parallel tests.
///
/// # Arguments
/// * `prefix` - A string prefix to identify the test type (e.g., "REG", "CHECKOUT")
///
/// # Returns
/// A unique string in the format: "{prefix}-{timestamp}-{counter}"
pub fn generate_unique_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", prefix, timestamp, counter)
}

/// Get the test database URL used by the storage test suites.
pub fn get_test_database_url() -> String {
    "sqlite::memory:".to_string()
}

/// Create an in-memory SQLite pool for tests.
///
/// The pool is capped at a single connection: every connection to
/// `sqlite::memory:` opens its own private database, so a larger pool would
/// scatter tables across unrelated databases.
pub async fn create_test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&get_test_database_url())
        .await
        .expect("failed to open in-memory test database")
}
