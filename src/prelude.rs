//! Convenient imports for common functionality.

pub use crate::backup::BackupPlan;
pub use crate::classify::{StatementCategory, classify};
pub use crate::config::{ConnectTarget, MysqlOptions, MysqlOptionsBuilder, SqliteOptions};
pub use crate::connection::DbConnection;
pub use crate::error::SqlHandlerError;
pub use crate::handler::SqlHandler;
pub use crate::params::{BoundParam, ParamType};
pub use crate::results::{CustomDbRow, QueryResult, ResultSet};
pub use crate::sanitize::{DataTypeClass, HtmlPolicy, NumericMode, Sanitizer, TypeSpec, sanitize};
pub use crate::types::{DatabaseType, RowValues, TransactionCommand};
