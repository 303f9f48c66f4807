// MySQL backend, built on sqlx:
// - connection: connect options, open/close, error mapping
// - params: binding typed parameters onto a sqlx query
// - query: result extraction
// - executor: SqlExecutor implementation

pub mod connection;
pub mod executor;
pub mod params;
pub mod query;

pub use connection::{MysqlConnection, connect_options};
pub use query::build_result_set;
