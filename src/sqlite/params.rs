use rusqlite::types::Value;

use crate::params::BoundParam;

/// Convert a single bound parameter to a rusqlite `Value`.
#[must_use]
pub fn bound_to_sqlite_value(param: BoundParam) -> Value {
    match param {
        BoundParam::Int(i) => Value::Integer(i),
        BoundParam::Double(f) => Value::Real(f),
        BoundParam::Text(s) => Value::Text(s),
        BoundParam::Blob(bytes) => Value::Blob(bytes),
        BoundParam::Null(_) => Value::Null,
    }
}

/// Unified `SQLite` parameter container.
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn convert(params: Vec<BoundParam>) -> Self {
        Params(params.into_iter().map(bound_to_sqlite_value).collect())
    }

    /// Build a borrowed params slice suitable for rusqlite execution.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.0.iter().map(|v| v as &dyn rusqlite::ToSql).collect()
    }
}
