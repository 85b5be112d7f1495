//! Summary table types.

use chrono::{NaiveDate, NaiveTime, Weekday};
use noisedp_core::Value;

/// Label of the per-window mean row.
pub const MEAN_LABEL: &str = "Mean (full survey)";
/// Label of the per-window maximum row.
pub const MAX_LABEL: &str = "Max (full survey)";
/// Label of the per-window lowest-mode row.
pub const MODE_LABEL: &str = "Lowest Mode (full survey)";
/// Label of the user-defined Lmax spectrum row.
pub const USER_LABEL: &str = "User-defined Lmax (full survey)";

/// One row of a summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Calendar day for daily rows; `None` for whole-survey rows.
    pub date: Option<NaiveDate>,
    /// Weekday name for daily rows, aggregate label otherwise.
    pub label: String,
    /// Window name.
    pub window: String,
    /// Window start time of day.
    pub start: Option<NaiveTime>,
    /// Window end time of day.
    pub end: Option<NaiveTime>,
    /// Metric values aligned with [`SummaryTable::columns`].
    pub values: Vec<Value>,
}

impl SummaryRow {
    /// Whether any metric value is missing.
    pub fn has_null(&self) -> bool {
        self.values.iter().any(Value::is_null)
    }
}

/// A table of summary rows over a fixed set of metric columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    /// Metric column names.
    pub columns: Vec<String>,
    /// Rows in display order.
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Empty table with the given metric columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a metric column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Numeric value at (row, column).
    pub fn number(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.values.get(col)?.as_f64()
    }

    /// Rows belonging to a window.
    pub fn rows_for<'a>(&'a self, window: &'a str) -> impl Iterator<Item = &'a SummaryRow> + 'a {
        self.rows.iter().filter(move |r| r.window == window)
    }

    /// Same rows restricted to the given columns, in the given order.
    /// Unknown columns are skipped.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Self {
        let picks: Vec<(String, usize)> = columns
            .iter()
            .filter_map(|c| {
                self.column_index(c.as_ref())
                    .map(|i| (c.as_ref().to_string(), i))
            })
            .collect();
        Self {
            columns: picks.iter().map(|(c, _)| c.clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| SummaryRow {
                    values: picks.iter().map(|&(_, i)| r.values[i].clone()).collect(),
                    ..r.clone()
                })
                .collect(),
        }
    }
}

/// Full English weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
