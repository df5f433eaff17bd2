//! Database module: the login record model, its schema and the store.
//!
//! Layout:
//! - `models.rs`: Rust struct mirroring a `login_records` row
//! - `schema.rs`: SQL DDL applied on first connection
//! - `sqlite.rs`: append/list operations on top of the shared connection

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::LoginRecord;
pub use schema::SQLITE_INIT;
pub use sqlite::{LoginRecordStore, SqlitePool, init_schema};
