//! Scalar values bound to placeholders and decoded from result columns.
//!
//! [`Value`] is the single currency between the query builder, the raw executor and
//! the driver: it implements `ToSql` for binding and `FromSql` for decoding, so
//! every supported column type round-trips through one enum.
//!
//! Supported column types are `bool`, the integer and float types, `text`/`varchar`/
//! `bpchar`/`name`, `bytea`, `date`, `timestamp`, `timestamptz`, `uuid` and
//! `json`/`jsonb`. Anything else (`numeric`, `money`, `interval`, arrays, ...) is
//! rejected for both binding and decoding, even when the value is NULL, and a row
//! holding such a column fails with [`Error::Decode`](crate::Error::Decode). Cast it
//! in SQL instead, e.g. `SELECT salary::float8` or `salary::text`.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};

type BoxError = Box<dyn StdError + Sync + Send>;

/// A scalar SQL value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(uuid::Uuid),
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampTz(_) => "timestamptz",
            Value::Uuid(_) => "uuid",
            Value::Json(_) => "json",
        }
    }

    /// Borrow the text payload, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an `Int` value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The boolean payload, if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    // Coercions used when binding. Text is parsed leniently because request
    // parameters always arrive as strings.

    fn coerce_i64(&self) -> Result<i64, BoxError> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Bool(v) => Ok(i64::from(*v)),
            Value::Float(v) if v.fract() == 0.0 => Ok(*v as i64),
            Value::Text(s) => Ok(s.trim().parse::<i64>()?),
            other => Err(mismatch(other, "integer")),
        }
    }

    fn coerce_f64(&self) -> Result<f64, BoxError> {
        match self {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::Text(s) => Ok(s.trim().parse::<f64>()?),
            other => Err(mismatch(other, "float")),
        }
    }

    fn coerce_bool(&self) -> Result<bool, BoxError> {
        match self {
            Value::Bool(v) => Ok(*v),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" | "on" => Ok(true),
                "false" | "f" | "0" | "no" | "off" => Ok(false),
                _ => Err(format!("invalid boolean literal: {s:?}").into()),
            },
            other => Err(mismatch(other, "boolean")),
        }
    }

    fn coerce_text(&self) -> Result<Cow<'_, str>, BoxError> {
        match self {
            Value::Text(s) => Ok(Cow::Borrowed(s)),
            Value::Bytes(_) | Value::Null => Err(mismatch(self, "text")),
            other => Ok(Cow::Owned(other.to_string())),
        }
    }
}

fn mismatch(value: &Value, target: &str) -> BoxError {
    format!("cannot bind a {} value to a {target} parameter", value.kind()).into()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Date(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::TimestampTz(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
        }
    }
}

/// Column types `Value` binds to and decodes from.
fn is_supported(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::FLOAT4
            | Type::FLOAT8
            | Type::TEXT
            | Type::VARCHAR
            | Type::BPCHAR
            | Type::NAME
            | Type::UNKNOWN
            | Type::BYTEA
            | Type::DATE
            | Type::TIMESTAMP
            | Type::TIMESTAMPTZ
            | Type::UUID
            | Type::JSON
            | Type::JSONB
    )
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if self.is_null() {
            return Ok(IsNull::Yes);
        }

        match *ty {
            Type::BOOL => self.coerce_bool()?.to_sql(ty, out),
            Type::INT2 => i16::try_from(self.coerce_i64()?)?.to_sql(ty, out),
            Type::INT4 => i32::try_from(self.coerce_i64()?)?.to_sql(ty, out),
            Type::INT8 => self.coerce_i64()?.to_sql(ty, out),
            Type::FLOAT4 => (self.coerce_f64()? as f32).to_sql(ty, out),
            Type::FLOAT8 => self.coerce_f64()?.to_sql(ty, out),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                let text: &str = &self.coerce_text()?;
                <&str as ToSql>::to_sql(&text, ty, out)
            }
            Type::BYTEA => match self {
                Value::Bytes(v) => v.to_sql(ty, out),
                Value::Text(s) => s.as_bytes().to_sql(ty, out),
                other => Err(mismatch(other, "bytea")),
            },
            Type::DATE => match self {
                Value::Date(v) => v.to_sql(ty, out),
                Value::Text(s) => s.trim().parse::<NaiveDate>()?.to_sql(ty, out),
                other => Err(mismatch(other, "date")),
            },
            Type::TIMESTAMP => match self {
                Value::Timestamp(v) => v.to_sql(ty, out),
                Value::TimestampTz(v) => v.naive_utc().to_sql(ty, out),
                Value::Text(s) => s.trim().parse::<NaiveDateTime>()?.to_sql(ty, out),
                other => Err(mismatch(other, "timestamp")),
            },
            Type::TIMESTAMPTZ => match self {
                Value::TimestampTz(v) => v.to_sql(ty, out),
                Value::Timestamp(v) => v.and_utc().to_sql(ty, out),
                Value::Text(s) => s.trim().parse::<DateTime<Utc>>()?.to_sql(ty, out),
                other => Err(mismatch(other, "timestamptz")),
            },
            Type::UUID => match self {
                Value::Uuid(v) => v.to_sql(ty, out),
                Value::Text(s) => s.trim().parse::<uuid::Uuid>()?.to_sql(ty, out),
                other => Err(mismatch(other, "uuid")),
            },
            Type::JSON | Type::JSONB => match self {
                Value::Json(v) => v.to_sql(ty, out),
                Value::Text(s) => serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out),
                other => Err(mismatch(other, "json")),
            },
            _ => Err(format!("unsupported parameter type: {}", ty).into()),
        }
    }

    fn accepts(ty: &Type) -> bool {
        is_supported(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                Value::Text(String::from_sql(ty, raw)?)
            }
            Type::BYTEA => Value::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::TimestampTz(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(uuid::Uuid::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            _ => return Err(format!("unsupported column type: {}", ty).into()),
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(ty: &Type) -> bool {
        is_supported(ty)
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident $(via $conv:ident)?),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v $(.$conv())?)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i16 => Int via into,
    i32 => Int via into,
    i64 => Int,
    u32 => Int via into,
    f32 => Float via into,
    f64 => Float,
    String => Text,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    uuid::Uuid => Uuid,
    serde_json::Value => Json,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a borrowed [`Value`] into a Rust type.
///
/// Used by [`Record::try_get`](crate::Record::try_get). Conversions are strict: a
/// `Text` column does not silently become an integer.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn unexpected(value: &Value, expected: &str) -> String {
    format!("expected {expected}, got {}", value.kind())
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        value.as_bool().ok_or_else(|| unexpected(value, "bool"))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        value.as_i64().ok_or_else(|| unexpected(value, "int"))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let v = i64::from_value(value)?;
        i32::try_from(v).map_err(|e| e.to_string())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(unexpected(other, "float")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| unexpected(value, "text"))
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Date(v) => Ok(*v),
            other => Err(unexpected(other, "date")),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(v) => Ok(*v),
            other => Err(unexpected(other, "timestamp")),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::TimestampTz(v) => Ok(*v),
            other => Err(unexpected(other, "timestamptz")),
        }
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Uuid(v) => Ok(*v),
            other => Err(unexpected(other, "uuid")),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Json(v) => Ok(v.clone()),
            other => Err(unexpected(other, "json")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value, ty: &Type) -> Result<(IsNull, BytesMut), BoxError> {
        let mut buf = BytesMut::new();
        let is_null = value.to_sql_checked(ty, &mut buf)?;
        Ok((is_null, buf))
    }

    #[test]
    fn null_binds_as_sql_null() {
        let (is_null, buf) = encode(&Value::Null, &Type::INT8).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn unlisted_types_are_rejected_both_ways() {
        assert!(!<Value as ToSql>::accepts(&Type::NUMERIC));
        assert!(!<Value as FromSql>::accepts(&Type::NUMERIC));
        assert!(encode(&Value::Null, &Type::NUMERIC).is_err());
        assert!(encode(&Value::Float(1.5), &Type::NUMERIC).is_err());
        assert!(<Value as FromSql>::accepts(&Type::FLOAT8));
    }

    #[test]
    fn text_path_parameter_binds_to_integer_column() {
        let (_, buf) = encode(&Value::from("42"), &Type::INT8).unwrap();
        assert_eq!(i64::from_sql(&Type::INT8, &buf).unwrap(), 42);

        let (_, buf) = encode(&Value::from(" 7 "), &Type::INT4).unwrap();
        assert_eq!(i32::from_sql(&Type::INT4, &buf).unwrap(), 7);
    }

    #[test]
    fn non_numeric_text_fails_integer_binding() {
        assert!(encode(&Value::from("abc"), &Type::INT8).is_err());
    }

    #[test]
    fn integer_narrowing_is_checked() {
        assert!(encode(&Value::Int(i64::from(i16::MAX) + 1), &Type::INT2).is_err());
    }

    #[test]
    fn numbers_render_as_text_for_text_columns() {
        let (_, buf) = encode(&Value::Int(5), &Type::TEXT).unwrap();
        assert_eq!(String::from_sql(&Type::TEXT, &buf).unwrap(), "5");
    }

    #[test]
    fn bool_literals_are_parsed() {
        let (_, buf) = encode(&Value::from("yes"), &Type::BOOL).unwrap();
        assert!(bool::from_sql(&Type::BOOL, &buf).unwrap());
        assert!(encode(&Value::from("maybe"), &Type::BOOL).is_err());
    }

    #[test]
    fn unsupported_types_are_rejected() {
        assert!(!<Value as ToSql>::accepts(&Type::INET));
        assert!(encode(&Value::Int(1), &Type::INET).is_err());
    }

    #[test]
    fn decodes_columns_into_values() {
        let mut buf = BytesMut::new();
        "hello".to_sql(&Type::TEXT, &mut buf).unwrap();
        assert_eq!(
            Value::from_sql(&Type::TEXT, &buf).unwrap(),
            Value::Text("hello".into())
        );

        let mut buf = BytesMut::new();
        12i32.to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(Value::from_sql(&Type::INT4, &buf).unwrap(), Value::Int(12));

        assert_eq!(Value::from_sql_null(&Type::TEXT).unwrap(), Value::Null);
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn from_value_is_strict() {
        assert_eq!(i64::from_value(&Value::Int(3)).unwrap(), 3);
        assert!(i64::from_value(&Value::Text("3".into())).is_err());
        assert_eq!(Option::<String>::from_value(&Value::Null).unwrap(), None);
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Null,
            Value::Int(1),
            Value::Text("a".into()),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,1,"a"]"#);
    }
}
