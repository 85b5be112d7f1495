//! Column-oriented time series.

use chrono::{Duration, NaiveDateTime};

use crate::error::{Error, Result};
use crate::metric::{FLAG_PREFIX, is_bookkeeping};
use crate::time::Resolution;
use crate::value::Value;

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// One value per index entry.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Create a column of nulls.
    pub fn nulls(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, vec![Value::Null; len])
    }

    /// Numeric view, `None` for non-numeric cells.
    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }
}

/// Timestamp index plus named columns.
///
/// Columns keep insertion order; every column has exactly one value per
/// index entry. Stages never mutate their input: they build a new series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    index: Vec<NaiveDateTime>,
    columns: Vec<Column>,
    resolution: Option<Resolution>,
}

impl TimeSeries {
    /// Create a series with the given index and no columns.
    pub fn new(index: Vec<NaiveDateTime>) -> Self {
        Self {
            index,
            columns: Vec::new(),
            resolution: None,
        }
    }

    /// Add a column, builder style.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        self.push_column(Column::new(name, values))?;
        Ok(self)
    }

    /// Record the sampling resolution, builder style.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Set or clear the recorded resolution.
    pub fn set_resolution(&mut self, resolution: Option<Resolution>) {
        self.resolution = resolution;
    }

    /// Append a column, replacing any existing column of the same name in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the column length differs from
    /// the index length.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if column.values.len() != self.index.len() {
            return Err(Error::LengthMismatch {
                column: column.name,
                expected: self.index.len(),
                actual: column.values.len(),
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Remove a column by name, returning it.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let pos = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(pos))
    }

    /// Timestamps.
    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Mutable column by name.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Recorded resolution, or the smallest gap between timestamps.
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution.or_else(|| Resolution::infer(&self.index))
    }

    /// Numeric view of a column.
    pub fn numeric(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name).map(Column::numbers)
    }

    /// Value at (row, column).
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|c| c.values.get(row))
    }

    /// Names of all `Flag_*` columns.
    pub fn flag_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.name.starts_with(FLAG_PREFIX))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Whether any measurement column of a row holds a value.
    ///
    /// Bookkeeping columns (flags, `Address`, `End_Time`, `Duration`,
    /// `Missing Samples`) do not make a row present.
    pub fn row_is_present(&self, row: usize) -> bool {
        self.columns
            .iter()
            .filter(|c| !is_bookkeeping(&c.name))
            .any(|c| !c.values[row].is_null())
    }

    /// New series with only the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            index: rows.iter().map(|&r| self.index[r]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(&c.name, rows.iter().map(|&r| c.values[r].clone()).collect()))
                .collect(),
            resolution: self.resolution,
        }
    }

    /// New series with only the named columns, in the given order. Unknown
    /// names are skipped.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Self {
        Self {
            index: self.index.clone(),
            columns: names
                .iter()
                .filter_map(|n| self.column(n.as_ref()).cloned())
                .collect(),
            resolution: self.resolution,
        }
    }

    /// New series with every timestamp moved by `offset`.
    pub fn shift_index(&self, offset: Duration) -> Self {
        Self {
            index: self.index.iter().map(|&t| t + offset).collect(),
            columns: self.columns.clone(),
            resolution: self.resolution,
        }
    }

    /// Decompose into index, columns and resolution.
    pub fn into_parts(self) -> (Vec<NaiveDateTime>, Vec<Column>, Option<Resolution>) {
        (self.index, self.columns, self.resolution)
    }

    /// Rebuild from parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] for the first column whose length
    /// differs from the index.
    pub fn from_parts(
        index: Vec<NaiveDateTime>,
        columns: Vec<Column>,
        resolution: Option<Resolution>,
    ) -> Result<Self> {
        let mut series = Self::new(index);
        series.resolution = resolution;
        for column in columns {
            series.push_column(column)?;
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn index(n: i64) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n).map(|i| start + Duration::minutes(i)).collect()
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = TimeSeries::new(index(3))
            .with_column("LAeq_Main", vec![Value::Number(1.0)])
            .unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { expected: 3, actual: 1, .. }));
    }

    #[test]
    fn push_replaces_in_place() {
        let mut s = TimeSeries::new(index(2))
            .with_column("a", vec![Value::Null; 2])
            .unwrap()
            .with_column("b", vec![Value::Null; 2])
            .unwrap();
        s.push_column(Column::new("a", vec![Value::Number(1.0); 2]))
            .unwrap();
        assert_eq!(s.column_names(), ["a", "b"]);
        assert_eq!(s.value(0, "a"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn select_and_presence() {
        let s = TimeSeries::new(index(3))
            .with_column(
                "LAeq_Main",
                vec![Value::Number(50.0), Value::Null, Value::Number(52.0)],
            )
            .unwrap()
            .with_column("Flag_Night", vec![Value::Null; 3])
            .unwrap();
        assert!(s.row_is_present(0));
        assert!(!s.row_is_present(1));
        assert_eq!(s.flag_columns(), ["Flag_Night"]);

        // Flags and row numbers alone do not make a gap present
        let s = s
            .with_column("Flag_Day", vec![Value::Text("Day".into()); 3])
            .unwrap()
            .with_column("Address", vec![Value::Number(1.0); 3])
            .unwrap();
        assert!(!s.row_is_present(1));

        let sub = s.select_rows(&[2]);
        assert_eq!(sub.len(), 1);
        assert_eq!(sub.value(0, "LAeq_Main"), Some(&Value::Number(52.0)));
    }

    #[test]
    fn resolution_falls_back_to_inference() {
        let s = TimeSeries::new(index(3));
        assert_eq!(s.resolution(), Some(Resolution::minutes(1)));
        let s = s.with_resolution(Resolution::minutes(5));
        assert_eq!(s.resolution(), Some(Resolution::minutes(5)));
    }
}
