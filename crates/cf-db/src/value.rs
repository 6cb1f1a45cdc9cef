//! Scalar values returned by single-value queries

use crate::error::{DbError, DbResult};
use chrono::NaiveDate;
use duckdb::types::Value;
use std::fmt;

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single value produced by a query
///
/// Integer widths are folded into one variant so that `COUNT(*)` (BIGINT)
/// and `SUM(int)` (HUGEINT) compare equal to the same literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// SQL NULL, also used for a query returning no rows
    Null,
    /// BOOLEAN
    Boolean(bool),
    /// Any integer width
    Integer(i128),
    /// FLOAT, DOUBLE, DECIMAL
    Float(f64),
    /// VARCHAR and ENUM
    Text(String),
    /// DATE
    Date(NaiveDate),
}

impl ScalarValue {
    /// Equality used by quality checks.
    ///
    /// Numbers compare by value across integer/float, dates compare against
    /// ISO-8601 text, and `NULL` equals `NULL`.
    pub fn matches(&self, other: &ScalarValue) -> bool {
        use ScalarValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(i), Float(f)) | (Float(f), Integer(i)) => (*i as f64) == *f,
            (Text(a), Text(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Date(d), Text(t)) | (Text(t), Date(d)) => d.format("%Y-%m-%d").to_string() == *t,
            _ => false,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Boolean(b) => write!(f, "{b}"),
            ScalarValue::Integer(i) => write!(f, "{i}"),
            ScalarValue::Float(x) => write!(f, "{x}"),
            ScalarValue::Text(s) => write!(f, "'{s}'"),
            ScalarValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Integer(i128::from(v))
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Boolean(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl TryFrom<Value> for ScalarValue {
    type Error = DbError;

    fn try_from(value: Value) -> DbResult<Self> {
        let scalar = match value {
            Value::Null => ScalarValue::Null,
            Value::Boolean(b) => ScalarValue::Boolean(b),
            Value::TinyInt(i) => ScalarValue::Integer(i.into()),
            Value::SmallInt(i) => ScalarValue::Integer(i.into()),
            Value::Int(i) => ScalarValue::Integer(i.into()),
            Value::BigInt(i) => ScalarValue::Integer(i.into()),
            Value::HugeInt(i) => ScalarValue::Integer(i),
            Value::UTinyInt(i) => ScalarValue::Integer(i.into()),
            Value::USmallInt(i) => ScalarValue::Integer(i.into()),
            Value::UInt(i) => ScalarValue::Integer(i.into()),
            Value::UBigInt(i) => ScalarValue::Integer(i.into()),
            Value::Float(x) => ScalarValue::Float(x.into()),
            Value::Double(x) => ScalarValue::Float(x),
            Value::Decimal(d) => {
                let text = d.to_string();
                let parsed = text
                    .parse::<f64>()
                    .map_err(|_| DbError::UnsupportedType(format!("DECIMAL {text}")))?;
                ScalarValue::Float(parsed)
            }
            Value::Text(s) => ScalarValue::Text(s),
            Value::Enum(s) => ScalarValue::Text(s),
            Value::Date32(days) => {
                let date = days
                    .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                    .and_then(NaiveDate::from_num_days_from_ce_opt)
                    .ok_or_else(|| DbError::UnsupportedType(format!("DATE {days}")))?;
                ScalarValue::Date(date)
            }
            other => return Err(DbError::UnsupportedType(format!("{other:?}"))),
        };
        Ok(scalar)
    }
}
