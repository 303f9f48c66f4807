//! Per-parameter type codes and coercion of [`RowValues`] into bindable values.
//!
//! Type codes follow the MySQL client convention: `i` integer, `d` double, `s` string,
//! `b` blob. Each parameter is coerced to its declared type before binding so the driver
//! sees a typed value, not just its textual form.

use crate::error::SqlHandlerError;
use crate::types::RowValues;

/// Declared binding type of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Integer,
    Double,
    String,
    Blob,
}

impl ParamType {
    /// Parse a single type code.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Statement` for a code other than `i`, `d`, `s`, `b`.
    pub fn from_code(code: char) -> Result<Self, SqlHandlerError> {
        match code {
            'i' => Ok(ParamType::Integer),
            'd' => Ok(ParamType::Double),
            's' => Ok(ParamType::String),
            'b' => Ok(ParamType::Blob),
            other => Err(SqlHandlerError::invalid_parameter(format!(
                "unknown parameter type code '{other}'"
            ))),
        }
    }

    #[must_use]
    pub fn code(self) -> char {
        match self {
            ParamType::Integer => 'i',
            ParamType::Double => 'd',
            ParamType::String => 's',
            ParamType::Blob => 'b',
        }
    }
}

/// Resolve the type list for `count` parameters.
///
/// `None` or an empty string means every parameter binds as a string.
///
/// # Errors
/// Returns `SqlHandlerError::Statement` when the code count differs from `count` or a code
/// is unknown.
pub fn resolve_types(types: Option<&str>, count: usize) -> Result<Vec<ParamType>, SqlHandlerError> {
    let codes = match types {
        None | Some("") => return Ok(vec![ParamType::String; count]),
        Some(codes) => codes,
    };
    let resolved = codes
        .chars()
        .map(ParamType::from_code)
        .collect::<Result<Vec<_>, _>>()?;
    if resolved.len() != count {
        return Err(SqlHandlerError::invalid_parameter(format!(
            "type string has {} codes for {count} parameters",
            resolved.len()
        )));
    }
    Ok(resolved)
}

/// A parameter after coercion to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundParam {
    Int(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    /// SQL NULL, remembering the declared type
    Null(ParamType),
}

/// Coerce `params` to the types named by `types`.
///
/// # Errors
/// Returns `SqlHandlerError::Statement` on a type-string mismatch or a value that cannot
/// be represented as its declared type (e.g. `"abc"` as `i`).
pub fn bind_params(
    params: &[RowValues],
    types: Option<&str>,
) -> Result<Vec<BoundParam>, SqlHandlerError> {
    let resolved = resolve_types(types, params.len())?;
    params
        .iter()
        .zip(resolved)
        .enumerate()
        .map(|(pos, (value, ty))| coerce(value, ty).map_err(|msg| {
            SqlHandlerError::invalid_parameter(format!("parameter {}: {msg}", pos + 1))
        }))
        .collect()
}

fn coerce(value: &RowValues, ty: ParamType) -> Result<BoundParam, String> {
    if value.is_null() {
        return Ok(BoundParam::Null(ty));
    }
    match ty {
        ParamType::Integer => as_integer(value).map(BoundParam::Int),
        ParamType::Double => as_double(value).map(BoundParam::Double),
        ParamType::String => Ok(match value {
            RowValues::Blob(bytes) => match String::from_utf8(bytes.clone()) {
                Ok(text) => BoundParam::Text(text),
                Err(_) => BoundParam::Blob(bytes.clone()),
            },
            other => BoundParam::Text(other.to_lexical().unwrap_or_default()),
        }),
        ParamType::Blob => Ok(match value {
            RowValues::Blob(bytes) => BoundParam::Blob(bytes.clone()),
            other => BoundParam::Blob(other.to_lexical().unwrap_or_default().into_bytes()),
        }),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_integer(value: &RowValues) -> Result<i64, String> {
    match value {
        RowValues::Int(i) => Ok(*i),
        RowValues::Bool(b) => Ok(i64::from(*b)),
        RowValues::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        RowValues::Text(s) => parse_integer(s),
        RowValues::JSON(serde_json::Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| format!("{n} is not an integer")),
        other => Err(format!("{other:?} cannot bind as integer")),
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_double(value: &RowValues) -> Result<f64, String> {
    match value {
        RowValues::Float(f) => Ok(*f),
        RowValues::Int(i) => Ok(*i as f64),
        RowValues::Bool(b) => Ok(f64::from(u8::from(*b))),
        RowValues::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{s}' is not a number")),
        RowValues::JSON(serde_json::Value::Number(n)) => {
            n.as_f64().ok_or_else(|| format!("{n} is not a number"))
        }
        other => Err(format!("{other:?} cannot bind as double")),
    }
}

fn parse_integer(text: &str) -> Result<i64, String> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| format!("'{text}' is not an integer"))
}
