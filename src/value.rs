use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::column_type::ColumnType;

/// Represents a single scalar flowing in or out of a column.
///
/// Used for appends, row reads, comparison operands and aggregate results.
/// Every value carries exactly one [ColumnType].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A calendar date.
    LocalDate(NaiveDate),
    /// A clock time.
    LocalTime(NaiveTime),
    /// A calendar date and clock time.
    LocalDateTime(NaiveDateTime),
    /// A UTF-8 string value, wrapped in an [Arc] for cheap cloning.
    String(Arc<str>),
    /// A boolean value.
    Boolean(bool),
}

impl Value {
    /// Returns the logical [ColumnType] of this value.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Integer(_) => ColumnType::Integer,
            Self::Float(_) => ColumnType::Float,
            Self::LocalDate(_) => ColumnType::LocalDate,
            Self::LocalTime(_) => ColumnType::LocalTime,
            Self::LocalDateTime(_) => ColumnType::LocalDateTime,
            Self::String(_) => ColumnType::String,
            Self::Boolean(_) => ColumnType::Boolean,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::LocalDate(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Self::LocalTime(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Self::LocalDateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns a reference to the inner string slice if this is a [Value::String].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Canonical text rendering, shared by `Column::get_string`.
///
/// Dates render as `YYYY-MM-DD`, times as `HH:MM:SS[.fff]` and date-times join
/// both with a `T`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::LocalDate(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::LocalTime(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Self::LocalDateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::LocalDate(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Self::LocalTime(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::LocalDateTime(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(Arc::from(value))
    }
}

impl From<Arc<str>> for Value {
    fn from(value: Arc<str>) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
