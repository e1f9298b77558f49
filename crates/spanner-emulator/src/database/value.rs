//! Typed column values and their JSON wire form.

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Write value that makes the store substitute the commit timestamp
pub const COMMIT_TIMESTAMP_SENTINEL: &str = "spanner.commit_timestamp()";

/// SQL function with the same effect inside DML text
pub const PENDING_COMMIT_TIMESTAMP: &str = "PENDING_COMMIT_TIMESTAMP()";

/// Column type codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeCode {
    /// BOOL
    Bool,
    /// INT64
    Int64,
    /// FLOAT64
    Float64,
    /// TIMESTAMP
    Timestamp,
    /// DATE
    Date,
    /// STRING
    String,
    /// BYTES
    Bytes,
    /// ARRAY
    Array,
    /// STRUCT
    Struct,
    /// NUMERIC
    Numeric,
    /// JSON
    Json,
    /// Anything this crate does not know
    #[default]
    #[serde(rename = "TYPE_CODE_UNSPECIFIED", other)]
    Unspecified,
}

/// A value bound as a parameter or written by a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Typed NULL
    Null(TypeCode),
    /// BOOL
    Bool(bool),
    /// INT64
    Int64(i64),
    /// FLOAT64
    Float64(f64),
    /// STRING
    String(String),
    /// TIMESTAMP
    Timestamp(DateTime<Utc>),
    /// The commit timestamp of the writing transaction
    CommitTimestamp,
}

impl Value {
    /// Type code sent alongside the value
    pub fn type_code(&self) -> TypeCode {
        match self {
            Value::Null(code) => *code,
            Value::Bool(_) => TypeCode::Bool,
            Value::Int64(_) => TypeCode::Int64,
            Value::Float64(_) => TypeCode::Float64,
            Value::String(_) => TypeCode::String,
            Value::Timestamp(_) | Value::CommitTimestamp => TypeCode::Timestamp,
        }
    }

    /// JSON encoding: INT64 as decimal strings, timestamps as RFC 3339 in UTC
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null(_) => serde_json::Value::Null,
            Value::Bool(b) => json!(b),
            Value::Int64(i) => json!(i.to_string()),
            Value::Float64(f) if f.is_nan() => json!("NaN"),
            Value::Float64(f) if f.is_infinite() => {
                json!(if *f > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Float64(f) => json!(f),
            Value::String(s) => json!(s),
            Value::Timestamp(t) => json!(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::CommitTimestamp => json!(COMMIT_TIMESTAMP_SENTINEL),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        s.map_or(Value::Null(TypeCode::String), Value::String)
    }
}

impl From<Option<i64>> for Value {
    fn from(i: Option<i64>) -> Self {
        i.map_or(Value::Null(TypeCode::Int64), Value::Int64)
    }
}

impl From<Option<DateTime<Utc>>> for Value {
    fn from(t: Option<DateTime<Utc>>) -> Self {
        t.map_or(Value::Null(TypeCode::Timestamp), Value::Timestamp)
    }
}

/// Decoding of a single JSON cell into a Rust type
pub trait FromValue: Sized {
    /// Decode `value`, declared in the result metadata as `code`
    fn from_value(value: &serde_json::Value, code: TypeCode) -> Result<Self>;
}

fn mismatch(expected: &str, value: &serde_json::Value) -> Error {
    Error::decode(format!("expected {}, got {}", expected, value))
}

impl FromValue for String {
    fn from_value(value: &serde_json::Value, _code: TypeCode) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &serde_json::Value, _code: TypeCode) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => s.parse().map_err(|_| mismatch("INT64", value)),
            serde_json::Value::Number(n) => n.as_i64().ok_or_else(|| mismatch("INT64", value)),
            _ => Err(mismatch("INT64", value)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &serde_json::Value, _code: TypeCode) -> Result<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| mismatch("FLOAT64", value)),
            serde_json::Value::String(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                _ => Err(mismatch("FLOAT64", value)),
            },
            _ => Err(mismatch("FLOAT64", value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &serde_json::Value, _code: TypeCode) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch("BOOL", value))
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &serde_json::Value, code: TypeCode) -> Result<Self> {
        if code != TypeCode::Timestamp && code != TypeCode::Unspecified {
            return Err(Error::decode(format!("expected TIMESTAMP column, got {:?}", code)));
        }
        let text = value.as_str().ok_or_else(|| mismatch("TIMESTAMP", value))?;
        DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| Error::decode(format!("invalid timestamp {:?}: {}", text, e)))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &serde_json::Value, code: TypeCode) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value, code).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_encoding() {
        let t = Utc.with_ymd_and_hms(1970, 1, 1, 1, 1, 1).unwrap()
            + chrono::Duration::nanoseconds(1);

        assert_eq!(Value::from(42i64).to_json(), json!("42"));
        assert_eq!(Value::from("zone").to_json(), json!("zone"));
        assert_eq!(Value::from(true).to_json(), json!(true));
        assert_eq!(Value::from(t).to_json(), json!("1970-01-01T01:01:01.000000001Z"));
        assert_eq!(
            Value::CommitTimestamp.to_json(),
            json!("spanner.commit_timestamp()")
        );
        assert_eq!(Value::from(None::<String>).to_json(), serde_json::Value::Null);
        assert_eq!(Value::from(f64::NAN).to_json(), json!("NaN"));
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(Value::CommitTimestamp.type_code(), TypeCode::Timestamp);
        assert_eq!(Value::from(None::<DateTime<Utc>>).type_code(), TypeCode::Timestamp);
        assert_eq!(
            serde_json::to_value(TypeCode::Float64).unwrap(),
            json!("FLOAT64")
        );
        let unknown: TypeCode = serde_json::from_value(json!("PROTO")).unwrap();
        assert_eq!(unknown, TypeCode::Unspecified);
    }

    #[test]
    fn test_decoding() {
        assert_eq!(i64::from_value(&json!("7"), TypeCode::Int64).unwrap(), 7);
        assert_eq!(
            Option::<String>::from_value(&serde_json::Value::Null, TypeCode::String).unwrap(),
            None
        );
        let t = DateTime::<Utc>::from_value(
            &json!("2024-05-01T10:00:00.123456Z"),
            TypeCode::Timestamp,
        )
        .unwrap();
        assert_eq!(t.timestamp_subsec_micros(), 123456);

        assert!(String::from_value(&json!(1), TypeCode::String).is_err());
        assert!(DateTime::<Utc>::from_value(&json!("x"), TypeCode::String).is_err());
    }
}
