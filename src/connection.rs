use async_trait::async_trait;

use crate::classify::StatementCategory;
use crate::config::ConnectTarget;
use crate::error::SqlHandlerError;
use crate::executor::SqlExecutor;
use crate::params::BoundParam;
use crate::results::QueryResult;
use crate::types::{DatabaseType, TransactionCommand};

#[cfg(feature = "mysql")]
use crate::mysql::MysqlConnection;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteConnection;

/// The live connection behind a handler, one variant per backend.
#[derive(Debug)]
pub enum DbConnection {
    #[cfg(feature = "mysql")]
    Mysql(MysqlConnection),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteConnection),
}

impl DbConnection {
    /// Open a connection to `target`.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Connection` if the driver cannot connect, or
    /// `SqlHandlerError::Unimplemented` if the backend is not compiled in.
    pub async fn open(target: &ConnectTarget) -> Result<Self, SqlHandlerError> {
        match target {
            #[cfg(feature = "mysql")]
            ConnectTarget::Mysql(opts) => MysqlConnection::open(opts).await.map(Self::Mysql),
            #[cfg(feature = "sqlite")]
            ConnectTarget::Sqlite(opts) => SqliteConnection::open(opts).await.map(Self::Sqlite),
            #[allow(unreachable_patterns)]
            _ => Err(SqlHandlerError::Unimplemented(
                "This database type is not enabled in the current build".to_string(),
            )),
        }
    }

    /// Close the connection, consuming it.
    ///
    /// # Errors
    /// Returns the driver's error if the orderly shutdown fails; the connection is gone
    /// either way.
    pub async fn close(self) -> Result<(), SqlHandlerError> {
        match self {
            #[cfg(feature = "mysql")]
            DbConnection::Mysql(conn) => conn.close().await,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(conn) => conn.close().await,
        }
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "mysql")]
            DbConnection::Mysql(_) => DatabaseType::Mysql,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(_) => DatabaseType::Sqlite,
        }
    }

    #[cfg(feature = "mysql")]
    pub fn as_mysql(&mut self) -> Option<&mut MysqlConnection> {
        match self {
            DbConnection::Mysql(conn) => Some(conn),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    #[cfg(feature = "sqlite")]
    pub fn as_sqlite(&mut self) -> Option<&mut SqliteConnection> {
        match self {
            DbConnection::Sqlite(conn) => Some(conn),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

#[async_trait]
impl SqlExecutor for DbConnection {
    async fn run_query(
        &mut self,
        query: &str,
        category: StatementCategory,
    ) -> Result<QueryResult, SqlHandlerError> {
        match self {
            #[cfg(feature = "mysql")]
            DbConnection::Mysql(conn) => conn.run_query(query, category).await,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(conn) => conn.run_query(query, category).await,
        }
    }

    async fn run_prepared(
        &mut self,
        query: &str,
        category: StatementCategory,
        params: Vec<BoundParam>,
    ) -> Result<QueryResult, SqlHandlerError> {
        match self {
            #[cfg(feature = "mysql")]
            DbConnection::Mysql(conn) => conn.run_prepared(query, category, params).await,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(conn) => conn.run_prepared(query, category, params).await,
        }
    }

    async fn run_transaction(
        &mut self,
        command: TransactionCommand,
    ) -> Result<(), SqlHandlerError> {
        match self {
            #[cfg(feature = "mysql")]
            DbConnection::Mysql(conn) => conn.run_transaction(command).await,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(conn) => conn.run_transaction(command).await,
        }
    }
}
