//! Shared pieces of the shop backend that every executable needs:
//! configuration loading and the test utilities used across crates.

pub mod config;

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{create_test_pool, generate_unique_id, get_test_database_url};
