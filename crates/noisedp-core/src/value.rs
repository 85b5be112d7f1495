//! Dynamically-typed cell values.

use chrono::{Duration, NaiveDateTime};
use std::fmt;

/// A single cell of a [`TimeSeries`](crate::TimeSeries) column.
///
/// Metric columns hold [`Value::Number`]; flag and `End_Time` columns hold
/// [`Value::Time`]; `Duration` holds [`Value::Span`]; free-form logger
/// columns may hold [`Value::Text`]. Gaps are [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// Numeric measurement (never NaN, see [`Value::number`]).
    Number(f64),
    /// Timestamp.
    Time(NaiveDateTime),
    /// Time span.
    Span(Duration),
    /// Free text.
    Text(String),
}

impl Value {
    /// Build a numeric value, mapping NaN and infinities to [`Value::Null`].
    pub fn number(v: f64) -> Self {
        if v.is_finite() {
            Value::Number(v)
        } else {
            Value::Null
        }
    }

    /// Build a value from an optional number.
    pub fn from_option(v: Option<f64>) -> Self {
        v.map_or(Value::Null, Value::number)
    }

    /// Whether the value is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric content, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Timestamp content, if any.
    pub fn as_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::number(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        Value::from_option(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::Time(t)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(v) => write!(f, "{v}"),
            Value::Time(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Span(d) => {
                let secs = d.num_seconds();
                write!(
                    f,
                    "{:02}:{:02}:{:02}",
                    secs / 3600,
                    (secs % 3600) / 60,
                    secs % 60
                )
            }
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}
