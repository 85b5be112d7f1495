//! Period removal.
//!
//! Keeps only rows that fall inside at least one of the named windows.
//! Every other row is nulled across all columns; the index is left intact so
//! the series stays regular.

use noisedp_core::{
    Error, Result, Stage, StageOutput, StageReport, TimeSeries, Value, flag_column_name,
};
use tracing::info;

use crate::args::expect_count;

/// Remove time stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovePeriods {
    windows: Vec<String>,
}

impl RemovePeriods {
    /// Stage name used in pipeline configuration.
    pub const NAME: &'static str = "Remove time";

    /// Keep rows flagged by any of `windows`.
    pub fn new(windows: Vec<String>) -> Self {
        Self { windows }
    }

    /// Build from `[window, ...]`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        expect_count(Self::NAME, args, 1, usize::MAX)?;
        Ok(Self::new(args.iter().map(|a| a.trim().to_string()).collect()))
    }

    /// Windows whose rows are kept.
    pub fn windows(&self) -> &[String] {
        &self.windows
    }
}

impl Stage for RemovePeriods {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, series: &TimeSeries) -> Result<StageOutput> {
        let flags = self
            .windows
            .iter()
            .map(|w| {
                let name = flag_column_name(w);
                series
                    .column(&name)
                    .ok_or_else(|| Error::missing_column(Self::NAME, name))
            })
            .collect::<Result<Vec<_>>>()?;

        let outside: Vec<usize> = (0..series.len())
            .filter(|&row| flags.iter().all(|f| f.values[row].is_null()))
            .collect();
        let removed = outside.iter().filter(|&&row| series.row_is_present(row)).count();

        let mut out = series.clone();
        let names: Vec<String> = out.column_names().into_iter().map(String::from).collect();
        for name in &names {
            if let Some(col) = out.column_mut(name) {
                for &row in &outside {
                    col.values[row] = Value::Null;
                }
            }
        }

        info!(removed, windows = ?self.windows, "nulled rows outside kept windows");
        Ok(StageOutput::new(out).with_report(StageReport::RowsRemoved(removed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series() -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let index: Vec<_> = (0..4).map(|i| start + Duration::hours(i)).collect();
        let t = Value::Time(start);
        TimeSeries::new(index)
            .with_column("LAeq_Main", vec![Value::Number(50.0); 4])
            .unwrap()
            .with_column("Flag_Day", vec![t.clone(), Value::Null, Value::Null, Value::Null])
            .unwrap()
            .with_column("Flag_Night", vec![Value::Null, t, Value::Null, Value::Null])
            .unwrap()
    }

    #[test]
    fn keeps_rows_in_any_window() {
        let stage = RemovePeriods::new(vec!["Day".into(), "Night".into()]);
        let out = stage.apply(&series()).unwrap();

        let col = &out.series.column("LAeq_Main").unwrap().values;
        assert_eq!(col[0], Value::Number(50.0));
        assert_eq!(col[1], Value::Number(50.0));
        assert!(col[2].is_null() && col[3].is_null());
        assert!(!out.series.row_is_present(3));
        assert_eq!(out.series.len(), 4);
        assert_eq!(out.report, StageReport::RowsRemoved(2));
    }

    #[test]
    fn single_window() {
        let out = RemovePeriods::new(vec!["Night".into()])
            .apply(&series())
            .unwrap();
        assert_eq!(out.report, StageReport::RowsRemoved(3));
        assert!(out.series.value(0, "LAeq_Main").unwrap().is_null());
    }

    #[test]
    fn unknown_window_is_an_error() {
        let err = RemovePeriods::new(vec!["Evening".into()])
            .apply(&series())
            .unwrap_err();
        assert_eq!(err, Error::missing_column("Remove time", "Flag_Evening"));
    }

    #[test]
    fn requires_a_window() {
        assert!(RemovePeriods::from_args(&[]).is_err());
    }
}
