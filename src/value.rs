//! Field and cell values for the classic InfluxDB data model.

use chrono::{DateTime, FixedOffset};
use ordered_float::OrderedFloat;

/// A single field value, on both the write side (point fields) and the read
/// side (cells of a query result row).
///
/// The classic wire protocol knows four field types: float, integer, string
/// and boolean. Unsigned integers were added to line protocol late in the
/// 1.x series and only formatted for servers that accept them. `Timestamp`
/// and `Null` appear on the read side only: the `time` column of a series
/// and JSON nulls in sparse rows.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// 64-bit floating point value (the protocol's default numeric type).
    Float(OrderedFloat<f64>),

    /// Signed 64-bit integer (`i`-suffixed in line protocol).
    Integer(i64),

    /// Unsigned 64-bit integer (`u`-suffixed in line protocol, 1.4+ servers).
    UnsignedInteger(u64),

    /// String value.
    String(String),

    /// Boolean value.
    Boolean(bool),

    /// RFC3339 timestamp with timezone, parsed from a `time` column.
    Timestamp(DateTime<FixedOffset>),

    /// Null cell.
    Null,
}

impl Value {
    /// Returns the value as an f64 if it is a `Float` variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f.into_inner()),
            _ => None,
        }
    }

    /// Returns the value as an i64 if it is an `Integer` variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a u64 if it is an `UnsignedInteger` variant.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UnsignedInteger(u) => Some(*u),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a bool if it is a `Boolean` variant.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a DateTime if it is a `Timestamp` variant.
    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value can be carried as a point field.
    ///
    /// `Timestamp` and `Null` are read-side values; the write protocols have
    /// no encoding for them.
    pub(crate) fn is_field_value(&self) -> bool {
        !matches!(self, Value::Timestamp(_) | Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{}", v),
            Value::Integer(i) => write!(f, "{}", i),
            Value::UnsignedInteger(u) => write!(f, "{}", u),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Null => write!(f, "null"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(OrderedFloat(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(OrderedFloat(f64::from(v)))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UnsignedInteger(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}
