use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::SqliteOptions;
use crate::error::SqlHandlerError;

pub(crate) type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// `SQLite` error code for a generic failure, used when rusqlite reports no code.
const SQLITE_ERROR: i64 = 1;

/// The single `SQLite` connection owned by a handler.
pub struct SqliteConnection {
    pub(crate) conn: SharedSqliteConnection,
    db_path: String,
}

impl SqliteConnection {
    /// Open the database file named by `opts`.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Connection` if rusqlite cannot open the file.
    pub async fn open(opts: &SqliteOptions) -> Result<Self, SqlHandlerError> {
        let db_path = opts.db_path.clone();
        let path = db_path.clone();
        let conn = tokio::task::spawn_blocking(move || rusqlite::Connection::open(path))
            .await
            .map_err(|e| SqlHandlerError::Connection {
                code: SQLITE_ERROR,
                message: format!("sqlite spawn_blocking join error: {e}"),
            })?
            .map_err(|e| {
                let (code, message) = error_parts(&e);
                SqlHandlerError::Connection { code, message }
            })?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path,
        })
    }

    /// Run `func` against the raw rusqlite connection on the blocking pool.
    ///
    /// # Errors
    /// Returns whatever `func` returns, or `SqlHandlerError::Statement` if the blocking task
    /// panicked.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, SqlHandlerError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlHandlerError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(Arc::clone(&self.conn), func).await
    }

    /// Close the connection, surfacing any error from `sqlite3_close`.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Statement` if `SQLite` refuses to close.
    pub async fn close(self) -> Result<(), SqlHandlerError> {
        let conn = match Arc::try_unwrap(self.conn) {
            Ok(mutex) => mutex.into_inner(),
            // still shared by an in-flight blocking task; dropping closes it when that ends
            Err(_) => return Ok(()),
        };
        tokio::task::spawn_blocking(move || conn.close().map_err(|(_, e)| statement_error(&e)))
            .await
            .map_err(|e| {
                SqlHandlerError::statement(SQLITE_ERROR, format!("sqlite close join error: {e}"))
            })?
    }

    #[must_use]
    pub fn db_path(&self) -> &str {
        &self.db_path
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("db_path", &self.db_path)
            .finish()
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlHandlerError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlHandlerError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| {
        SqlHandlerError::statement(SQLITE_ERROR, format!("sqlite spawn_blocking join error: {e}"))
    })?
}

fn error_parts(err: &rusqlite::Error) -> (i64, String) {
    match err {
        rusqlite::Error::SqliteFailure(ffi_err, message) => (
            i64::from(ffi_err.extended_code),
            message.clone().unwrap_or_else(|| ffi_err.to_string()),
        ),
        other => (SQLITE_ERROR, other.to_string()),
    }
}

pub(crate) fn statement_error(err: &rusqlite::Error) -> SqlHandlerError {
    let (code, message) = error_parts(err);
    SqlHandlerError::Statement { code, message }
}

/// Lets closures passed to [`SqliteConnection::with_connection`] use `?` on rusqlite calls.
impl From<rusqlite::Error> for SqlHandlerError {
    fn from(err: rusqlite::Error) -> Self {
        statement_error(&err)
    }
}
