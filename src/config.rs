use crate::error::SqlHandlerError;
use crate::types::DatabaseType;

/// Prefix of the environment variables read by [`MysqlOptions::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "MYSQL_";

const DEFAULT_HOST: &str = "localhost";

/// Connection settings for a MySQL server.
///
/// A socket, when present, wins over host and port.
#[derive(Clone, PartialEq, Eq)]
pub struct MysqlOptions {
    pub host: Option<String>,
    pub database: String,
    pub username: String,
    pub password: String,
    pub socket: Option<String>,
    pub port: Option<u16>,
}

impl MysqlOptions {
    #[must_use]
    pub fn new(database: String, username: String, password: String) -> Self {
        Self {
            host: None,
            database,
            username,
            password,
            socket: None,
            port: None,
        }
    }

    #[must_use]
    pub fn builder(database: String, username: String, password: String) -> MysqlOptionsBuilder {
        MysqlOptionsBuilder::new(database, username, password)
    }

    /// Read `MYSQL_HOST`, `MYSQL_DATABASE`, `MYSQL_USER`, `MYSQL_PASSWORD`, `MYSQL_SOCKET`
    /// and `MYSQL_PORT` from the process environment.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Config` if `MYSQL_PORT` is set but not a port number.
    pub fn from_env() -> Result<Self, SqlHandlerError> {
        Self::from_lookup(DEFAULT_ENV_PREFIX, |key| std::env::var(key).ok())
    }

    /// Resolve options through `lookup`, which receives `<prefix>HOST`, `<prefix>DATABASE`,
    /// `<prefix>USER`, `<prefix>PASSWORD`, `<prefix>SOCKET` and `<prefix>PORT`.
    ///
    /// Missing database, user, or password resolve to empty strings, as the server will
    /// reject them at connect time anyway.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Config` if the port value is not a port number.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, SqlHandlerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{prefix}{name}"));
        let port = match get("PORT").filter(|p| !p.trim().is_empty()) {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|e| {
                SqlHandlerError::Config(format!("{prefix}PORT={raw:?} is not a port: {e}"))
            })?),
            None => None,
        };
        Ok(Self {
            host: get("HOST").filter(|h| !h.is_empty()),
            database: get("DATABASE").unwrap_or_default(),
            username: get("USER").unwrap_or_default(),
            password: get("PASSWORD").unwrap_or_default(),
            socket: normalize_socket(get("SOCKET")),
            port,
        })
    }

    /// Host used for TCP connections.
    #[must_use]
    pub fn host_or_default(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }
}

impl std::fmt::Debug for MysqlOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MysqlOptions")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("socket", &self.socket)
            .field("port", &self.port)
            .finish()
    }
}

/// Treat an empty socket, or one spelled `NULL`/`FALSE`/`0` in any case, as unset.
#[must_use]
pub fn normalize_socket(socket: Option<String>) -> Option<String> {
    socket.filter(|s| {
        let upper = s.trim().to_ascii_uppercase();
        !(upper.is_empty() || matches!(upper.as_str(), "NULL" | "FALSE" | "0"))
    })
}

/// Fluent builder for MySQL options.
#[derive(Debug, Clone)]
pub struct MysqlOptionsBuilder {
    opts: MysqlOptions,
}

impl MysqlOptionsBuilder {
    #[must_use]
    pub fn new(database: String, username: String, password: String) -> Self {
        Self {
            opts: MysqlOptions::new(database, username, password),
        }
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = Some(port);
        self
    }

    /// Connect through a local socket instead of TCP. Sentinel spellings clear it.
    #[must_use]
    pub fn socket(mut self, socket: impl Into<String>) -> Self {
        self.opts.socket = normalize_socket(Some(socket.into()));
        self
    }

    #[must_use]
    pub fn finish(self) -> MysqlOptions {
        self.opts
    }
}

/// Options for a `SQLite` database file (or `:memory:`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteOptions {
    pub db_path: String,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(":memory:".to_string())
    }
}

/// Where a handler connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    Mysql(MysqlOptions),
    Sqlite(SqliteOptions),
}

impl ConnectTarget {
    /// Backend for this target.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Unimplemented` when the backend is not compiled in.
    pub fn database_type(&self) -> Result<DatabaseType, SqlHandlerError> {
        match self {
            #[cfg(feature = "mysql")]
            ConnectTarget::Mysql(_) => Ok(DatabaseType::Mysql),
            #[cfg(feature = "sqlite")]
            ConnectTarget::Sqlite(_) => Ok(DatabaseType::Sqlite),
            #[allow(unreachable_patterns)]
            _ => Err(SqlHandlerError::Unimplemented(
                "This database type is not enabled in the current build".to_string(),
            )),
        }
    }
}
