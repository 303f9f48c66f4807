use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::SqlHandlerError;

/// Values that can be stored in a database row or used as query parameters.
///
/// The same enum is used for result cells and for prepared-statement parameters:
/// ```rust
/// use sql_handler::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Null,
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Textual form used when a value is interpolated or bound as a string.
    ///
    /// Returns `None` for NULL. Blobs are decoded lossily.
    #[must_use]
    pub fn to_lexical(&self) -> Option<String> {
        match self {
            RowValues::Null => None,
            RowValues::Int(i) => Some(i.to_string()),
            RowValues::Float(f) => Some(f.to_string()),
            RowValues::Text(s) => Some(s.clone()),
            RowValues::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            RowValues::Timestamp(dt) => Some(dt.format("%F %T%.f").to_string()),
            RowValues::JSON(v) => Some(v.to_string()),
            RowValues::Blob(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

impl Serialize for RowValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValues::Int(i) => serializer.serialize_i64(*i),
            RowValues::Float(f) => serializer.serialize_f64(*f),
            RowValues::Text(s) => serializer.serialize_str(s),
            RowValues::Bool(b) => serializer.serialize_bool(*b),
            RowValues::Timestamp(dt) => {
                serializer.serialize_str(&dt.format("%F %T%.f").to_string())
            }
            RowValues::Null => serializer.serialize_none(),
            RowValues::JSON(v) => v.serialize(serializer),
            RowValues::Blob(bytes) => serializer.serialize_bytes(bytes),
        }
    }
}

/// The database type behind a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DatabaseType {
    /// MySQL or MariaDB
    #[cfg(feature = "mysql")]
    Mysql,
    /// `SQLite` database
    #[cfg(feature = "sqlite")]
    Sqlite,
}

/// Transaction control commands, numbered 0/1/2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionCommand {
    Start = 0,
    Commit = 1,
    Rollback = 2,
}

impl TryFrom<i64> for TransactionCommand {
    type Error = SqlHandlerError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TransactionCommand::Start),
            1 => Ok(TransactionCommand::Commit),
            2 => Ok(TransactionCommand::Rollback),
            other => Err(SqlHandlerError::Config(format!(
                "unknown transaction command {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_command_codes() {
        assert_eq!(
            TransactionCommand::try_from(0).ok(),
            Some(TransactionCommand::Start)
        );
        assert_eq!(
            TransactionCommand::try_from(2).ok(),
            Some(TransactionCommand::Rollback)
        );
        assert!(TransactionCommand::try_from(5).is_err());
        assert!(TransactionCommand::try_from(-1).is_err());
        assert_eq!(TransactionCommand::Commit as i64, 1);
    }

    #[test]
    fn lexical_forms() {
        assert_eq!(RowValues::Int(-4).to_lexical().as_deref(), Some("-4"));
        assert_eq!(RowValues::Bool(true).to_lexical().as_deref(), Some("1"));
        assert_eq!(RowValues::Null.to_lexical(), None);
        let dt = NaiveDateTime::parse_from_str("2024-01-02 03:04:05", "%Y-%m-%d %H:%M:%S")
            .expect("timestamp");
        assert_eq!(
            RowValues::Timestamp(dt).to_lexical().as_deref(),
            Some("2024-01-02 03:04:05")
        );
    }

    #[test]
    fn accessors_match_only_their_variant() {
        assert_eq!(RowValues::Int(3).as_int(), Some(&3));
        assert_eq!(RowValues::Text("3".into()).as_int(), None);
        assert_eq!(RowValues::Float(0.5).as_float(), Some(0.5));
        assert_eq!(RowValues::Int(1).as_float(), None);
        assert_eq!(RowValues::Text("x".into()).as_text(), Some("x"));
        assert_eq!(RowValues::Blob(vec![7]).as_blob(), Some(&[7_u8][..]));
        assert_eq!(RowValues::Null.as_blob(), None);
    }

    #[test]
    fn serializes_to_plain_json() {
        let values = vec![
            RowValues::Int(1),
            RowValues::Text("Ada".into()),
            RowValues::Null,
        ];
        let json = serde_json::to_string(&values).expect("serialize");
        assert_eq!(json, r#"[1,"Ada",null]"#);
    }
}
