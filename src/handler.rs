use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::classify::classify;
use crate::config::{ConnectTarget, MysqlOptions, SqliteOptions};
use crate::connection::DbConnection;
use crate::error::SqlHandlerError;
use crate::executor::SqlExecutor;
use crate::params::bind_params;
use crate::results::QueryResult;
use crate::types::{DatabaseType, RowValues, TransactionCommand};

enum HandlerState {
    Unopened,
    Open(DbConnection),
    Closed,
}

struct Inner {
    state: HandlerState,
    last_insert_id: u64,
    last_error: Option<(i64, String)>,
}

/// Owner of exactly one database connection.
///
/// The connection is opened on first use and kept until [`SqlHandler::close`] or drop.
/// Only `close` shuts it down gracefully (COM_QUIT for MySQL, `sqlite3_close` for
/// `SQLite`). Dropping an open handler just drops the driver connection: the socket or
/// file handle is released, but no goodbye is sent and close errors are not reported.
/// Every operation holds an internal lock for its whole prepare/bind/execute/fetch
/// sequence, so a handler can be shared between tasks (e.g. in an `Arc`) without
/// interleaving statements on the connection.
///
/// ```rust,no_run
/// use sql_handler::prelude::*;
///
/// # async fn demo() -> Result<(), SqlHandlerError> {
/// let db = SqlHandler::from_env()?;
/// match db.execute("SELECT id, name FROM users").await? {
///     QueryResult::Rows(rows) => println!("{} users", rows.len()),
///     other => println!("unexpected {other:?}"),
/// }
/// db.close().await;
/// # Ok(())
/// # }
/// ```
pub struct SqlHandler {
    target: ConnectTarget,
    inner: Mutex<Inner>,
}

impl SqlHandler {
    /// Handler for `target`. Nothing is opened until the first operation.
    #[must_use]
    pub fn new(target: ConnectTarget) -> Self {
        Self {
            target,
            inner: Mutex::new(Inner {
                state: HandlerState::Unopened,
                last_insert_id: 0,
                last_error: None,
            }),
        }
    }

    /// MySQL handler configured from the `MYSQL_*` environment variables.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Config` if the environment holds an invalid port.
    pub fn from_env() -> Result<Self, SqlHandlerError> {
        Ok(Self::mysql(MysqlOptions::from_env()?))
    }

    #[must_use]
    pub fn mysql(opts: MysqlOptions) -> Self {
        Self::new(ConnectTarget::Mysql(opts))
    }

    #[must_use]
    pub fn sqlite(opts: SqliteOptions) -> Self {
        Self::new(ConnectTarget::Sqlite(opts))
    }

    #[must_use]
    pub fn target(&self) -> &ConnectTarget {
        &self.target
    }

    /// Backend this handler talks to.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Unimplemented` when the backend is not compiled in.
    pub fn database_type(&self) -> Result<DatabaseType, SqlHandlerError> {
        self.target.database_type()
    }

    async fn ensure_open(&self, inner: &mut Inner) -> Result<(), SqlHandlerError> {
        match inner.state {
            HandlerState::Open(_) => Ok(()),
            HandlerState::Closed => Err(SqlHandlerError::Closed),
            HandlerState::Unopened => {
                let conn = match DbConnection::open(&self.target).await {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "database connection failed");
                        inner.last_error = e
                            .driver_parts()
                            .map(|(code, message)| (code, message.to_string()));
                        return Err(e);
                    }
                };
                debug!(backend = ?conn.database_type(), "database connection opened");
                inner.state = HandlerState::Open(conn);
                Ok(())
            }
        }
    }

    /// The live connection, opening it first if needed.
    ///
    /// The guard holds the handler lock; drop it before calling other handler methods.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Connection` if the connect fails and
    /// `SqlHandlerError::Closed` after [`SqlHandler::close`].
    pub async fn get_connection(
        &self,
    ) -> Result<MappedMutexGuard<'_, DbConnection>, SqlHandlerError> {
        let mut inner = self.inner.lock().await;
        self.ensure_open(&mut inner).await?;
        MutexGuard::try_map(inner, |inner| match &mut inner.state {
            HandlerState::Open(conn) => Some(conn),
            _ => None,
        })
        .map_err(|_| SqlHandlerError::Closed)
    }

    /// Whether a connection is currently open.
    pub async fn is_open(&self) -> bool {
        matches!(self.inner.lock().await.state, HandlerState::Open(_))
    }

    /// Run `query` as-is (no escaping, no parameters).
    ///
    /// SELECT/SHOW/DESCRIBE/EXPLAIN return every row, INSERT returns the generated id, and
    /// everything else returns the affected-row count.
    ///
    /// # Errors
    /// `EmptyQuery` for an empty query, `Connection` if the lazy connect fails, and
    /// `Statement` for any driver-reported SQL error.
    pub async fn execute(&self, query: &str) -> Result<QueryResult, SqlHandlerError> {
        if query.trim().is_empty() {
            return Err(SqlHandlerError::EmptyQuery);
        }
        let category = classify(query);
        let mut inner = self.inner.lock().await;
        self.ensure_open(&mut inner).await?;
        let HandlerState::Open(conn) = &mut inner.state else {
            return Err(SqlHandlerError::Closed);
        };
        debug!(?category, "executing query");
        let outcome = conn.run_query(query, category).await;
        Self::record(&mut inner, outcome)
    }

    /// Prepare `query`, bind `params` positionally with `param_types`, and execute.
    ///
    /// `param_types` holds one code per parameter (`i`, `d`, `s`, `b`). When omitted every
    /// parameter binds as a string, so `None` behaves exactly like `Some("sss")` for three
    /// parameters. The result shape follows the same rules as [`SqlHandler::execute`].
    ///
    /// # Errors
    /// `EmptyQuery` for an empty query, `Connection` if the lazy connect fails, and
    /// `Statement` for a type-string mismatch, an unbindable value, or a driver error.
    pub async fn execute_prepared(
        &self,
        query: &str,
        params: &[RowValues],
        param_types: Option<&str>,
    ) -> Result<QueryResult, SqlHandlerError> {
        if query.trim().is_empty() {
            return Err(SqlHandlerError::EmptyQuery);
        }
        let category = classify(query);
        let mut inner = self.inner.lock().await;
        self.ensure_open(&mut inner).await?;
        let bound = match bind_params(params, param_types) {
            Ok(bound) => bound,
            Err(e) => return Self::record(&mut inner, Err(e)),
        };
        let HandlerState::Open(conn) = &mut inner.state else {
            return Err(SqlHandlerError::Closed);
        };
        debug!(?category, params = bound.len(), "executing prepared statement");
        let outcome = conn.run_prepared(query, category, bound).await;
        Self::record(&mut inner, outcome)
    }

    /// Issue begin, commit or rollback. Returns `true` iff the error code afterwards is 0.
    ///
    /// Nested or named transactions are not supported; a second `Start` before the first
    /// is resolved behaves however the backend behaves.
    pub async fn transaction(&self, command: TransactionCommand) -> bool {
        let mut inner = self.inner.lock().await;
        if let Err(e) = self.ensure_open(&mut inner).await {
            warn!(error = %e, ?command, "transaction command without a connection");
            return false;
        }
        let HandlerState::Open(conn) = &mut inner.state else {
            return false;
        };
        let outcome = conn.run_transaction(command).await;
        match outcome {
            Ok(()) => {
                inner.last_error = None;
                true
            }
            Err(e) => {
                warn!(error = %e, ?command, "transaction command failed");
                inner.last_error = e
                    .driver_parts()
                    .map(|(code, message)| (code, message.to_string()));
                false
            }
        }
    }

    /// [`SqlHandler::transaction`] for a numeric command (0 start, 1 commit, 2 rollback).
    /// Any other number returns `false` without touching the connection.
    pub async fn transaction_code(&self, command: i64) -> bool {
        match TransactionCommand::try_from(command) {
            Ok(command) => self.transaction(command).await,
            Err(_) => false,
        }
    }

    /// Id generated by the most recent successful INSERT, or 0.
    pub async fn last_insert_id(&self) -> u64 {
        self.inner.lock().await.last_insert_id
    }

    /// Error code of the most recent operation, 0 if it succeeded. A failed connect
    /// leaves its code here too.
    pub async fn last_error_code(&self) -> i64 {
        self.inner
            .lock()
            .await
            .last_error
            .as_ref()
            .map_or(0, |(code, _)| *code)
    }

    /// Error message of the most recent operation, empty if it succeeded.
    pub async fn last_error_message(&self) -> String {
        self.inner
            .lock()
            .await
            .last_error
            .as_ref()
            .map(|(_, message)| message.clone())
            .unwrap_or_default()
    }

    /// Dump the database with `mysqldump` into `directory`, named with today's date and the
    /// current unix time.
    ///
    /// # Errors
    /// `Unimplemented` for non-MySQL handlers, otherwise whatever [`BackupPlan::run`]
    /// returns.
    ///
    /// [`BackupPlan::run`]: crate::backup::BackupPlan::run
    pub async fn backup(&self, directory: &str) -> Result<std::path::PathBuf, SqlHandlerError> {
        let ConnectTarget::Mysql(opts) = &self.target else {
            return Err(SqlHandlerError::Unimplemented(
                "backup is only available for MySQL handlers".to_string(),
            ));
        };
        let plan = crate::backup::BackupPlan::new(opts, directory, &chrono::Local::now());
        plan.run().await
    }

    /// Close the connection if it is open; later operations then fail with
    /// `SqlHandlerError::Closed`. Closing a handler that never connected, or closing twice,
    /// does nothing.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        let previous = std::mem::replace(&mut inner.state, HandlerState::Closed);
        match previous {
            HandlerState::Open(conn) => {
                if let Err(e) = conn.close().await {
                    warn!(error = %e, "error while closing database connection");
                } else {
                    debug!("database connection closed");
                }
            }
            HandlerState::Unopened => {
                // never opened; keep it that way
                inner.state = HandlerState::Unopened;
            }
            HandlerState::Closed => {}
        }
    }

    fn record(
        inner: &mut Inner,
        outcome: Result<QueryResult, SqlHandlerError>,
    ) -> Result<QueryResult, SqlHandlerError> {
        match &outcome {
            Ok(result) => {
                inner.last_error = None;
                if let QueryResult::InsertId(id) = result {
                    inner.last_insert_id = *id;
                }
            }
            Err(e) => {
                warn!(error = %e, "statement failed");
                if let Some((code, message)) = e.driver_parts() {
                    inner.last_error = Some((code, message.to_string()));
                }
            }
        }
        outcome
    }
}

/// Logs when an open connection is dropped without [`SqlHandler::close`]; the driver
/// connection is then released by its own drop.
impl Drop for SqlHandler {
    fn drop(&mut self) {
        if let HandlerState::Open(conn) = &self.inner.get_mut().state {
            debug!(backend = ?conn.database_type(), "dropping open database connection");
        }
    }
}

impl std::fmt::Debug for SqlHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlHandler")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
