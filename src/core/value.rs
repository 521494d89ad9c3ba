use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::decimal_to_f64;
use crate::error::{ChartError, ChartResult};

/// Kind tag carried by values, dimensions and coordinate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Double,
    DateTime,
    Index,
    Category,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Double => "double",
            Self::DateTime => "date/time",
            Self::Index => "index",
            Self::Category => "category",
        };
        f.write_str(name)
    }
}

/// A raw data-coordinate-system value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Double(f64),
    DateTime(NaiveDateTime),
    Index(i64),
    Category(String),
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Double(_) => ValueKind::Double,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Index(_) => ValueKind::Index,
            Self::Category(_) => ValueKind::Category,
        }
    }

    pub fn from_decimal(value: Decimal) -> ChartResult<Self> {
        Ok(Self::Double(decimal_to_f64(value, "value")?))
    }

    #[must_use]
    pub fn from_utc(time: DateTime<Utc>) -> Self {
        Self::DateTime(time.naive_utc())
    }

    #[must_use]
    pub fn category(name: impl Into<String>) -> Self {
        Self::Category(name.into())
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Self::Index(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Category(name) => Some(name),
            _ => None,
        }
    }

    pub(crate) fn expect_f64(&self) -> ChartResult<f64> {
        self.as_f64().ok_or(ChartError::TypeMismatch {
            expected: ValueKind::Double,
            found: self.kind(),
        })
    }

    pub(crate) fn expect_datetime(&self) -> ChartResult<NaiveDateTime> {
        self.as_datetime().ok_or(ChartError::TypeMismatch {
            expected: ValueKind::DateTime,
            found: self.kind(),
        })
    }

    pub(crate) fn expect_index(&self) -> ChartResult<i64> {
        self.as_index().ok_or(ChartError::TypeMismatch {
            expected: ValueKind::Index,
            found: self.kind(),
        })
    }

    pub(crate) fn expect_category(&self) -> ChartResult<&str> {
        self.as_category().ok_or(ChartError::TypeMismatch {
            expected: ValueKind::Category,
            found: self.kind(),
        })
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Index(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Category(value.to_owned())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double(value) => write!(f, "{value}"),
            Self::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            Self::Index(value) => write!(f, "#{value}"),
            Self::Category(name) => f.write_str(name),
        }
    }
}
