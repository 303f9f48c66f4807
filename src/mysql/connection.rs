use std::fmt;

use sqlx::Connection;
use sqlx::mysql::{MySqlConnectOptions, MySqlDatabaseError};

use crate::config::MysqlOptions;
use crate::error::{CLIENT_CONNECTION_ERROR, CLIENT_UNKNOWN_ERROR, SqlHandlerError};

/// The single MySQL connection owned by a handler.
pub struct MysqlConnection {
    pub(crate) conn: sqlx::MySqlConnection,
    database: String,
}

/// Translate options into sqlx connect options. A socket replaces host and port.
#[must_use]
pub fn connect_options(opts: &MysqlOptions) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .username(&opts.username)
        .password(&opts.password);
    if !opts.database.is_empty() {
        options = options.database(&opts.database);
    }
    match &opts.socket {
        Some(socket) => options.socket(socket),
        None => {
            let options = options.host(opts.host_or_default());
            match opts.port {
                Some(port) => options.port(port),
                None => options,
            }
        }
    }
}

impl MysqlConnection {
    /// Connect to the server described by `opts`.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Connection` with the server error number (or a client error
    /// number such as 2002 for socket failures) when the connect fails.
    pub async fn open(opts: &MysqlOptions) -> Result<Self, SqlHandlerError> {
        let conn = sqlx::MySqlConnection::connect_with(&connect_options(opts))
            .await
            .map_err(|e| {
                let (code, message) = error_parts(&e);
                SqlHandlerError::Connection { code, message }
            })?;
        Ok(Self {
            conn,
            database: opts.database.clone(),
        })
    }

    /// Send COM_QUIT and shut the socket.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Statement` if the goodbye exchange fails.
    pub async fn close(self) -> Result<(), SqlHandlerError> {
        self.conn.close().await.map_err(|e| statement_error(&e))
    }

    /// Borrow the sqlx connection for operations this crate does not wrap.
    pub fn raw(&mut self) -> &mut sqlx::MySqlConnection {
        &mut self.conn
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }
}

impl fmt::Debug for MysqlConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlConnection")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

/// Error number and message for a sqlx error, using MySQL client numbers when the server
/// did not supply one.
pub(crate) fn error_parts(err: &sqlx::Error) -> (i64, String) {
    match err {
        sqlx::Error::Database(db) => {
            let code = db
                .try_downcast_ref::<MySqlDatabaseError>()
                .map_or(CLIENT_UNKNOWN_ERROR, |e| i64::from(e.number()));
            (code, db.message().to_string())
        }
        sqlx::Error::Io(e) => (CLIENT_CONNECTION_ERROR, e.to_string()),
        other => (CLIENT_UNKNOWN_ERROR, other.to_string()),
    }
}

pub(crate) fn statement_error(err: &sqlx::Error) -> SqlHandlerError {
    let (code, message) = error_parts(err);
    SqlHandlerError::Statement { code, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_connection_code() {
        let err = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        let (code, message) = error_parts(&err);
        assert_eq!(code, CLIENT_CONNECTION_ERROR);
        assert!(message.contains("refused"));
    }

    #[test]
    fn other_errors_use_unknown_code() {
        let (code, _) = error_parts(&sqlx::Error::RowNotFound);
        assert_eq!(code, CLIENT_UNKNOWN_ERROR);
        assert!(matches!(
            statement_error(&sqlx::Error::RowNotFound),
            SqlHandlerError::Statement { .. }
        ));
    }
}
