//! Runtime SQL values and conversions to and from Rust types.
//!
//! `Value` is what crosses the connection boundary in both directions: bound
//! parameters are lowered into `Value`s before reaching the driver, and every
//! column read from a row arrives as a `Value` before a parser converts it with
//! [`FromValue`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Error, Result};

/// A runtime SQL value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Integer of any width
    Int(i64),
    /// Floating point of any width
    Float(f64),
    /// Text (TEXT, VARCHAR, etc.)
    Text(String),
    /// Binary data (BLOB, BYTEA)
    Bytes(Vec<u8>),
    /// Calendar date without time zone
    Date(NaiveDate),
    /// Date and time without time zone
    Timestamp(NaiveDateTime),
    /// JSON document
    Json(serde_json::Value),
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

impl Value {
    /// Returns true if this is a NULL value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extract as a string slice if the value is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extract as i64 if the value is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract as f64 if the value is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract as bool. Integers 0 and 1 count, since SQLite has no boolean type.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            _ => None,
        }
    }

    /// Get type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Json(_) => "json",
        }
    }

    /// Render the value as text the way a text-only driver column would hold it.
    ///
    /// Returns `None` for NULL and binary data.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::Bytes(_) => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
            Value::Timestamp(ts) => Some(ts.format(TIMESTAMP_FORMATS[0]).to_string()),
            Value::Json(j) => Some(j.to_string()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveDateTime => Timestamp,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

/// Nested options collapse: `Some(None)` binds as NULL just like `None`.
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Conversion from a column value into a Rust type.
///
/// `column` is only used to label errors.
pub trait FromValue: Sized {
    fn from_value(value: Value, column: &str) -> Result<Self>;
}

fn mismatch(column: &str, expected: &'static str, found: &Value) -> Error {
    match found {
        Value::Null => Error::UnexpectedNull {
            column: column.to_string(),
        },
        other => Error::ColumnType {
            column: column.to_string(),
            expected,
            found: other.type_name().to_string(),
        },
    }
}

impl FromValue for Value {
    fn from_value(value: Value, _column: &str) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, column).map(Some),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch(column, "text", &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        value.as_i64().ok_or_else(|| mismatch(column, "integer", &value))
    }
}

macro_rules! narrow_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value, column: &str) -> Result<Self> {
                    let wide = i64::from_value(value, column)?;
                    <$ty>::try_from(wide).map_err(|_| Error::ColumnType {
                        column: column.to_string(),
                        expected: stringify!($ty),
                        found: format!("integer {}", wide),
                    })
                }
            }
        )*
    };
}

narrow_int!(i32, i16, u32);

impl FromValue for f64 {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        value.as_f64().ok_or_else(|| mismatch(column, "float", &value))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        f64::from_value(value, column).map(|f| f as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch(column, "bool", &value))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(mismatch(column, "bytes", &other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        match value {
            Value::Date(d) => Ok(d),
            Value::Timestamp(ts) => Ok(ts.date()),
            Value::Text(ref s) => {
                NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| mismatch(column, "date", &value))
            }
            other => Err(mismatch(column, "date", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        match value {
            Value::Timestamp(ts) => Ok(ts),
            Value::Text(ref s) => TIMESTAMP_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .ok_or_else(|| mismatch(column, "timestamp", &value)),
            other => Err(mismatch(column, "timestamp", &other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value, column: &str) -> Result<Self> {
        match value {
            Value::Json(j) => Ok(j),
            Value::Text(ref s) => serde_json::from_str(s).map_err(|_| mismatch(column, "json", &value)),
            other => Err(mismatch(column, "json", &other)),
        }
    }
}
