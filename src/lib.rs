pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod service;
pub mod types;
pub mod view;

pub use db::{LoginRecord, LoginRecordStore};
pub use error::{ConnectionError, StoreError, SubmitError, ValidationError};
pub use service::connection_actor::ConnectionManager;
pub use service::connector::{Connect, DbTarget, SqliteConnector};
