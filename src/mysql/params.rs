use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;

use crate::params::{BoundParam, ParamType};

/// Bind `params` positionally onto `query`, each with its declared MySQL type.
///
/// NULLs are bound with the declared type so the server sees a typed NULL.
pub fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: Vec<BoundParam>,
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            BoundParam::Int(i) => query.bind(i),
            BoundParam::Double(f) => query.bind(f),
            BoundParam::Text(s) => query.bind(s),
            BoundParam::Blob(bytes) => query.bind(bytes),
            BoundParam::Null(ParamType::Integer) => query.bind(None::<i64>),
            BoundParam::Null(ParamType::Double) => query.bind(None::<f64>),
            BoundParam::Null(ParamType::String) => query.bind(None::<String>),
            BoundParam::Null(ParamType::Blob) => query.bind(None::<Vec<u8>>),
        };
    }
    query
}
