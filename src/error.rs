use thiserror::Error;

/// MySQL client error number used when the driver gives no server error number.
pub const CLIENT_UNKNOWN_ERROR: i64 = 2000;
/// MySQL client error number for a failed socket or TCP connect.
pub const CLIENT_CONNECTION_ERROR: i64 = 2002;
/// MySQL client error number for a parameter that cannot be bound.
pub const CLIENT_INVALID_PARAMETER: i64 = 2034;

/// Every failure the handler can report.
///
/// Only [`SqlHandlerError::Connection`] is meant to be treated as fatal by a host. The other
/// variants are ordinary values for the caller to branch on; a query that matched no rows is
/// never an error.
#[derive(Debug, Error)]
pub enum SqlHandlerError {
    /// Opening the connection failed. Carries the driver's error code and message.
    #[error("Connection error #{code}: {message}")]
    Connection { code: i64, message: String },

    /// The query string was empty.
    #[error("Query string is empty")]
    EmptyQuery,

    /// Prepare, bind, or execute reported a nonzero error code.
    #[error("Statement error #{code}: {message}")]
    Statement { code: i64, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The handler was closed; the connection is never reopened.
    #[error("Connection already closed")]
    Closed,

    #[error("Backup error: {0}")]
    Backup(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

impl SqlHandlerError {
    pub(crate) fn statement(code: i64, message: impl Into<String>) -> Self {
        SqlHandlerError::Statement {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::statement(CLIENT_INVALID_PARAMETER, message)
    }

    /// Driver error code carried by `Connection` and `Statement` errors.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            SqlHandlerError::Connection { code, .. } | SqlHandlerError::Statement { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }

    /// Driver error code and message, for errors that carry them.
    #[must_use]
    pub fn driver_parts(&self) -> Option<(i64, &str)> {
        match self {
            SqlHandlerError::Connection { code, message }
            | SqlHandlerError::Statement { code, message } => Some((*code, message.as_str())),
            _ => None,
        }
    }
}
