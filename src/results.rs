pub mod result_set;
pub mod row;

use serde::Serialize;

pub use result_set::ResultSet;
pub use row::CustomDbRow;

/// Outcome of a successful statement. The variant is picked by the statement's
/// [`StatementCategory`](crate::classify::StatementCategory).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResult {
    /// All rows of a SELECT/SHOW/DESCRIBE/EXPLAIN
    Rows(ResultSet),
    /// Id generated by an INSERT
    InsertId(u64),
    /// Rows changed by any other statement
    AffectedRows(u64),
}

impl QueryResult {
    #[must_use]
    pub fn rows(&self) -> Option<&ResultSet> {
        match self {
            QueryResult::Rows(rs) => Some(rs),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_rows(self) -> Option<ResultSet> {
        match self {
            QueryResult::Rows(rs) => Some(rs),
            _ => None,
        }
    }

    #[must_use]
    pub fn insert_id(&self) -> Option<u64> {
        match self {
            QueryResult::InsertId(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn affected_rows(&self) -> Option<u64> {
        match self {
            QueryResult::AffectedRows(n) => Some(*n),
            _ => None,
        }
    }
}
