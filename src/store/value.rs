//! Driver-neutral scalar values and result rows.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::error::{StoreError, StoreResult};

/// A typed scalar read from (or bound to) a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer view; booleans count as 0/1 and integral floats are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            SqlValue::Bool(b) => Some(i64::from(*b)),
            SqlValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Floating-point view of numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Float(f) => Some(*f),
            SqlValue::Int(v) => Some(*v as f64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String view of text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view; integers are truthy when non-zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(b) => Some(*b),
            SqlValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// `None` for NULL, otherwise the value itself.
    pub fn into_option(self) -> Option<SqlValue> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Text(s) => write!(f, "{}", s),
            SqlValue::Date(d) => write!(f, "{}", d),
            SqlValue::Time(t) => write!(f, "{}", t),
            SqlValue::DateTime(dt) => write!(f, "{}", dt),
            SqlValue::Bytes(b) => {
                write!(f, "0x")?;
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One result row, values in select-list order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `idx`, or `None` past the end.
    pub fn get(&self, idx: usize) -> Option<&SqlValue> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    fn require(&self, idx: usize) -> StoreResult<&SqlValue> {
        self.values.get(idx).ok_or_else(|| {
            StoreError::decode(format!(
                "expected at least {} columns, got {}",
                idx + 1,
                self.values.len()
            ))
        })
    }

    /// Non-null integer at `idx`.
    pub fn i64_at(&self, idx: usize) -> StoreResult<i64> {
        let value = self.require(idx)?;
        value
            .as_i64()
            .ok_or_else(|| StoreError::decode(format!("column {} is not an integer: {:?}", idx, value)))
    }

    /// Nullable integer at `idx`.
    pub fn opt_i64_at(&self, idx: usize) -> StoreResult<Option<i64>> {
        match self.require(idx)? {
            SqlValue::Null => Ok(None),
            _ => self.i64_at(idx).map(Some),
        }
    }

    /// Non-null count at `idx`; negative values are rejected.
    pub fn count_at(&self, idx: usize) -> StoreResult<u64> {
        let v = self.i64_at(idx)?;
        u64::try_from(v).map_err(|_| StoreError::decode(format!("negative count: {}", v)))
    }

    /// Non-null text at `idx`.
    pub fn str_at(&self, idx: usize) -> StoreResult<&str> {
        let value = self.require(idx)?;
        value
            .as_str()
            .ok_or_else(|| StoreError::decode(format!("column {} is not text: {:?}", idx, value)))
    }

    /// 0/1 flag at `idx`; NULL reads as false.
    pub fn flag_at(&self, idx: usize) -> StoreResult<bool> {
        match self.require(idx)? {
            SqlValue::Null => Ok(false),
            value => value
                .as_bool()
                .ok_or_else(|| StoreError::decode(format!("column {} is not a flag: {:?}", idx, value))),
        }
    }

    /// Owned value at `idx`, NULL mapped to `None`.
    pub fn take_value(&mut self, idx: usize) -> StoreResult<Option<SqlValue>> {
        self.require(idx)?;
        Ok(std::mem::replace(&mut self.values[idx], SqlValue::Null).into_option())
    }
}
