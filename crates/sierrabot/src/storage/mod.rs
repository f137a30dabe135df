//! SQLite user store

pub mod db;

pub use db::{create_pool, get_connection, DbConnection, DbPool};
