// SQLite backend, split the same way as the MySQL one:
// - connection: opening, the blocking-thread bridge, error mapping
// - params: bound parameters to rusqlite values
// - query: result extraction
// - executor: SqlExecutor implementation

pub mod connection;
pub mod executor;
pub mod params;
pub mod query;

pub use connection::SqliteConnection;
pub use query::build_result_set;
