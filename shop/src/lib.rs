//! The shop backend: REST API over a SQLite catalog, cart, and order store.

pub mod api_model;
pub mod bootstrap;
pub mod db_model;
pub mod http;
pub mod sqlite_storage;
pub mod storage;
