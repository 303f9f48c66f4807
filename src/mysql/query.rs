use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use super::connection::statement_error;
use crate::error::SqlHandlerError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// How a MySQL cell is decoded, picked from the column's type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDecoder {
    Signed,
    Unsigned,
    Float,
    Double,
    DateTime,
    Date,
    /// TIME can be negative or exceed 24h; those values fall back to text.
    Time,
    Json,
    Bytes,
    Null,
    /// Everything else, DECIMAL included so no digits are lost.
    Text,
}

impl CellDecoder {
    #[must_use]
    pub fn for_type_name(type_name: &str) -> Self {
        match type_name {
            "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
                CellDecoder::Signed
            }
            unsigned if unsigned.ends_with("UNSIGNED") => CellDecoder::Unsigned,
            "FLOAT" => CellDecoder::Float,
            "DOUBLE" => CellDecoder::Double,
            "DATETIME" | "TIMESTAMP" => CellDecoder::DateTime,
            "DATE" => CellDecoder::Date,
            "TIME" => CellDecoder::Time,
            "JSON" => CellDecoder::Json,
            "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB"
            | "GEOMETRY" | "BIT" => CellDecoder::Bytes,
            "NULL" => CellDecoder::Null,
            _ => CellDecoder::Text,
        }
    }
}

/// Unsigned values above `i64::MAX` are kept as their decimal text.
#[must_use]
pub fn unsigned_value(value: u64) -> RowValues {
    i64::try_from(value).map_or_else(|_| RowValues::Text(value.to_string()), RowValues::Int)
}

/// Render a TIME cell: as `HH:MM:SS[.f]` when it fits a time of day, otherwise the raw
/// server text (e.g. `-01:00:00` or `838:59:59`).
///
/// # Errors
/// Returns whatever `raw` returns when the fallback text cannot be read.
pub fn time_value<E>(
    parsed: Option<NaiveTime>,
    raw: impl FnOnce() -> Result<String, E>,
) -> Result<RowValues, E> {
    match parsed {
        Some(t) => Ok(RowValues::Text(t.format("%H:%M:%S%.f").to_string())),
        None => raw().map(RowValues::Text),
    }
}

/// Extract a `RowValues` from a MySQL row, keyed on the column's declared type.
///
/// # Errors
/// Returns `SqlHandlerError::Statement` if the cell cannot be decoded.
pub fn mysql_extract_value(row: &MySqlRow, idx: usize) -> Result<RowValues, SqlHandlerError> {
    let raw = row.try_get_raw(idx).map_err(|e| statement_error(&e))?;
    if raw.is_null() {
        return Ok(RowValues::Null);
    }
    let decoder = CellDecoder::for_type_name(row.column(idx).type_info().name());
    let err = |e: sqlx::Error| statement_error(&e);

    let value = match decoder {
        CellDecoder::Signed => RowValues::Int(row.try_get_unchecked::<i64, _>(idx).map_err(err)?),
        CellDecoder::Unsigned => {
            unsigned_value(row.try_get_unchecked::<u64, _>(idx).map_err(err)?)
        }
        CellDecoder::Float => RowValues::Float(f64::from(
            row.try_get_unchecked::<f32, _>(idx).map_err(err)?,
        )),
        CellDecoder::Double => RowValues::Float(row.try_get_unchecked::<f64, _>(idx).map_err(err)?),
        CellDecoder::DateTime => {
            RowValues::Timestamp(row.try_get::<NaiveDateTime, _>(idx).map_err(err)?)
        }
        CellDecoder::Date => RowValues::Text(
            row.try_get::<NaiveDate, _>(idx)
                .map_err(err)?
                .format("%Y-%m-%d")
                .to_string(),
        ),
        CellDecoder::Time => time_value(row.try_get::<NaiveTime, _>(idx).ok(), || {
            row.try_get_unchecked::<String, _>(idx)
        })
        .map_err(err)?,
        CellDecoder::Json => RowValues::JSON(row.try_get::<serde_json::Value, _>(idx).map_err(err)?),
        CellDecoder::Bytes => RowValues::Blob(row.try_get_unchecked::<Vec<u8>, _>(idx).map_err(err)?),
        CellDecoder::Null => RowValues::Null,
        CellDecoder::Text => RowValues::Text(row.try_get_unchecked::<String, _>(idx).map_err(err)?),
    };
    Ok(value)
}

/// Materialize fetched rows. Column names come from the first row, so an empty fetch
/// yields an empty set without columns.
///
/// # Errors
/// Returns `SqlHandlerError::Statement` if any cell cannot be decoded.
pub fn build_result_set(rows: &[MySqlRow]) -> Result<ResultSet, SqlHandlerError> {
    let column_names: Vec<String> = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        })
        .unwrap_or_default();
    let col_count = column_names.len();
    let mut result_set = ResultSet::with_columns(column_names, rows.len());

    for row in rows {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(mysql_extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
