//! Single-connection database access for MySQL and `SQLite`.
//!
//! A [`SqlHandler`] owns one lazily opened connection. Plain and prepared statements are
//! classified by their leading keyword and answered with a [`QueryResult`]: every row for
//! SELECT/SHOW/DESCRIBE/EXPLAIN, the generated id for INSERT, and the affected-row count
//! otherwise. Failures are always returned as [`SqlHandlerError`] values.

pub mod backup;
pub mod classify;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod params;
pub mod prelude;
pub mod results;
pub mod sanitize;
pub mod types;

mod handler;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use classify::{StatementCategory, classify};
pub use error::SqlHandlerError;
pub use handler::SqlHandler;
pub use results::{CustomDbRow, QueryResult, ResultSet};
pub use sanitize::{DataTypeClass, sanitize};
pub use types::{DatabaseType, RowValues, TransactionCommand};
