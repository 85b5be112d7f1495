//! Metric-aware resampling to a coarser resolution.
//!
//! Bins start at midnight of the first sample's day and run contiguously at
//! the output resolution up to the bin holding the last sample. Each column
//! is aggregated over its non-null values according to its [`MetricKind`]:
//!
//! | Kind | Rule |
//! |------|------|
//! | Leq | energy mean (`Log`) or arithmetic mean (`Linear`) |
//! | Lmin | minimum |
//! | Lmax | `(max_remove+1)`-th largest, or minimum if fewer samples |
//! | L## | mean, median, lowest mode or lower quartile |
//! | LE | energy sum |
//! | End_Time | last |
//! | Duration | the output resolution |
//! | anything else | first |
//!
//! Empty bins are null. A `Missing Samples` column is appended with
//! `out/in - present rows` per bin (0 when the input is coarser than the
//! output), where a row is present if any of its measurement columns holds a
//! value. Flags and other bookkeeping columns do not count.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use noisedp_core::{
    Column, ColumnDescriptor, Error, MISSING_SAMPLES, MetricKind, Resolution, Result, Stage,
    StageOutput, StageReport, TimeSeries, Value, log_mean, log_sum, lowest_mode, mean, median,
    quantile, trimmed_max,
};
use tracing::{debug, info};

use crate::args::{expect_count, parse_count, parse_percentiles, parse_resolution, parse_weighting};

/// Averaging rule for percentile (`L##`) columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AverageType {
    /// Arithmetic mean.
    #[default]
    Mean,
    /// Median.
    Median,
    /// Lowest mode of whole-dB rounded values.
    Mode,
    /// 25th percentile, linear interpolation.
    LowerQuartile,
}

impl AverageType {
    /// Apply the rule to one bin.
    pub fn aggregate(self, values: &[f64]) -> Option<f64> {
        match self {
            AverageType::Mean => mean(values),
            AverageType::Median => median(values),
            AverageType::Mode => lowest_mode(values),
            AverageType::LowerQuartile => quantile(values, 0.25),
        }
    }

    /// Short name: `mean`, `median`, `mode` or `lq`.
    pub fn as_str(self) -> &'static str {
        match self {
            AverageType::Mean => "mean",
            AverageType::Median => "median",
            AverageType::Mode => "mode",
            AverageType::LowerQuartile => "lq",
        }
    }
}

impl FromStr for AverageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(AverageType::Mean),
            "median" => Ok(AverageType::Median),
            "mode" => Ok(AverageType::Mode),
            "lq" | "lower-quartile" => Ok(AverageType::LowerQuartile),
            _ => Err(Error::InvalidAverageType(s.to_string())),
        }
    }
}

impl fmt::Display for AverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Averaging rule for Leq columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LeqMode {
    /// Arithmetic mean of dB values.
    Linear,
    /// Energy mean.
    #[default]
    Log,
}

impl FromStr for LeqMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(LeqMode::Linear),
            "log" => Ok(LeqMode::Log),
            _ => Err(Error::InvalidLeqMode(s.to_string())),
        }
    }
}

impl fmt::Display for LeqMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeqMode::Linear => f.write_str("linear"),
            LeqMode::Log => f.write_str("log"),
        }
    }
}

/// Resampling parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResampleParams {
    /// Output resolution.
    pub resolution: Resolution,
    /// Number of highest Lmax samples ignored per bin.
    pub max_remove: usize,
    /// Percentile averaging rule.
    pub avg_type: AverageType,
    /// Frequency weighting letter.
    pub weighting: char,
    /// Survey percentiles.
    pub percentiles: Vec<u32>,
    /// Leq averaging rule.
    pub leq_mode: LeqMode,
}

impl ResampleParams {
    /// Parameters with defaults: no Lmax trimming, mean percentiles, log Leq.
    pub fn new(resolution: Resolution, weighting: char, percentiles: Vec<u32>) -> Self {
        Self {
            resolution,
            max_remove: 0,
            avg_type: AverageType::Mean,
            weighting,
            percentiles,
            leq_mode: LeqMode::Log,
        }
    }

    /// Set the Lmax trim count.
    pub fn with_max_remove(mut self, max_remove: usize) -> Self {
        self.max_remove = max_remove;
        self
    }

    /// Set the percentile averaging rule.
    pub fn with_avg_type(mut self, avg_type: AverageType) -> Self {
        self.avg_type = avg_type;
        self
    }

    /// Set the Leq averaging rule.
    pub fn with_leq_mode(mut self, leq_mode: LeqMode) -> Self {
        self.leq_mode = leq_mode;
        self
    }
}

/// Rows of a series grouped into contiguous bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    /// Start timestamp of each bin.
    pub starts: Vec<NaiveDateTime>,
    /// Source row indices per bin, in index order.
    pub rows: Vec<Vec<usize>>,
}

impl Bins {
    /// Group `index` into bins of `resolution` anchored at midnight of the
    /// earliest timestamp's day.
    pub fn new(index: &[NaiveDateTime], resolution: Resolution) -> Self {
        let (Some(&first), Some(&last)) = (index.iter().min(), index.iter().max()) else {
            return Self {
                starts: Vec::new(),
                rows: Vec::new(),
            };
        };
        let origin = first.date().and_time(chrono::NaiveTime::MIN);
        let step = resolution.as_duration();
        let first_bin = resolution.bin_start(origin, first);
        let last_bin = resolution.bin_start(origin, last);

        let mut starts = Vec::new();
        let mut t = first_bin;
        while t <= last_bin {
            starts.push(t);
            t += step;
        }

        let mut rows = vec![Vec::new(); starts.len()];
        let step_us = step.num_microseconds().unwrap_or(i64::MAX);
        for (i, &ts) in index.iter().enumerate() {
            let offset = (resolution.bin_start(origin, ts) - first_bin)
                .num_microseconds()
                .unwrap_or(0);
            rows[(offset / step_us) as usize].push(i);
        }
        Self { starts, rows }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Whether there are no bins.
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Re-sample stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resample {
    params: ResampleParams,
}

impl Resample {
    /// Stage name used in pipeline configuration.
    pub const NAME: &'static str = "Re-sample";

    /// Create the stage.
    pub fn new(params: ResampleParams) -> Self {
        Self { params }
    }

    /// Build from
    /// `[resolution, max_remove, avg_type, weighting, percentiles, leq_mode]`.
    ///
    /// The pipeline appends the last three from survey metadata.
    pub fn from_args(args: &[String]) -> Result<Self> {
        expect_count(Self::NAME, args, 6, 6)?;
        let resolution = parse_resolution(Self::NAME, &args[0])?;
        let max_remove = parse_count(Self::NAME, &args[1])?;
        let avg_type: AverageType = args[2].parse()?;
        let weighting = parse_weighting(Self::NAME, &args[3])?;
        let percentiles = parse_percentiles(Self::NAME, &args[4])?;
        let leq_mode: LeqMode = args[5].parse()?;

        Ok(Self::new(
            ResampleParams::new(resolution, weighting, percentiles)
                .with_max_remove(max_remove)
                .with_avg_type(avg_type)
                .with_leq_mode(leq_mode),
        ))
    }

    /// Resampling parameters.
    pub fn params(&self) -> &ResampleParams {
        &self.params
    }

    fn aggregate(&self, desc: &ColumnDescriptor, values: &[Value], rows: &[usize]) -> Value {
        let p = &self.params;
        let numbers = || -> Vec<f64> { rows.iter().filter_map(|&r| values[r].as_f64()).collect() };
        let present = || rows.iter().map(|&r| &values[r]).filter(|v| !v.is_null());

        match desc.kind {
            MetricKind::Leq => Value::from_option(match p.leq_mode {
                LeqMode::Log => log_mean(&numbers()),
                LeqMode::Linear => mean(&numbers()),
            }),
            MetricKind::Lmin => Value::from_option(numbers().into_iter().reduce(f64::min)),
            MetricKind::Lmax => Value::from_option(trimmed_max(&numbers(), p.max_remove)),
            MetricKind::Percentile(_) => Value::from_option(p.avg_type.aggregate(&numbers())),
            MetricKind::Exposure => Value::from_option(log_sum(&numbers())),
            MetricKind::EndTime => present().last().cloned().unwrap_or_default(),
            MetricKind::Duration => Value::Span(p.resolution.as_duration()),
            MetricKind::Flag | MetricKind::Other => present().next().cloned().unwrap_or_default(),
        }
    }
}

impl Stage for Resample {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, series: &TimeSeries) -> Result<StageOutput> {
        let p = &self.params;
        let bins = Bins::new(series.index(), p.resolution);

        let mut columns = Vec::with_capacity(series.columns().len() + 1);
        for col in series.columns() {
            if col.name == MISSING_SAMPLES {
                continue;
            }
            let desc = ColumnDescriptor::classify(&col.name, p.weighting, &p.percentiles);
            let values = bins
                .rows
                .iter()
                .map(|rows| self.aggregate(&desc, &col.values, rows))
                .collect();
            columns.push(Column::new(&col.name, values));
        }

        // Expected samples per bin; 0 when the input is coarser than the output
        let expected = series
            .resolution()
            .map(|input| p.resolution.ratio(input))
            .filter(|&r| r >= 1.0);
        let missing: Vec<(NaiveDateTime, f64)> = bins
            .starts
            .iter()
            .zip(&bins.rows)
            .map(|(&start, rows)| {
                let present = rows.iter().filter(|&&r| series.row_is_present(r)).count();
                (start, expected.map_or(0.0, |n| n - present as f64))
            })
            .collect();
        columns.push(Column::new(
            MISSING_SAMPLES,
            missing.iter().map(|&(_, n)| Value::Number(n)).collect(),
        ));

        debug!(
            bins = bins.len(),
            avg_type = %p.avg_type,
            leq_mode = %p.leq_mode,
            "resampled columns"
        );
        info!(
            rows_in = series.len(),
            rows_out = bins.len(),
            resolution = %p.resolution,
            "re-sampled series"
        );

        let out = TimeSeries::from_parts(bins.starts, columns, Some(p.resolution))?;
        Ok(StageOutput::new(out).with_report(StageReport::MissingSamples(missing)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn minutes(start: NaiveDateTime, n: usize) -> Vec<NaiveDateTime> {
        (0..n as i64).map(|i| start + Duration::minutes(i)).collect()
    }

    fn numbers(v: &[f64]) -> Vec<Value> {
        v.iter().map(|&x| Value::Number(x)).collect()
    }

    fn params(minutes: i64) -> ResampleParams {
        ResampleParams::new(Resolution::minutes(minutes), 'A', vec![10, 90])
    }

    fn single(series: &TimeSeries, col: &str, p: ResampleParams) -> f64 {
        let out = Resample::new(p).apply(series).unwrap().series;
        out.value(0, col).unwrap().as_f64().unwrap()
    }

    #[test]
    fn leq_log_and_linear() {
        let s = TimeSeries::new(minutes(at(0, 0), 4))
            .with_column("LAeq_Main", numbers(&[50.0, 52.0, 54.0, 56.0]))
            .unwrap();
        let log = single(&s, "LAeq_Main", params(4));
        assert!((log - 53.5592).abs() < 1e-3, "got {log}");

        let lin = single(&s, "LAeq_Main", params(4).with_leq_mode(LeqMode::Linear));
        assert_eq!(lin, 53.0);
    }

    #[test]
    fn lmax_trimmed() {
        let s = TimeSeries::new(minutes(at(0, 0), 4))
            .with_column("LAmax_Main", numbers(&[60.0, 65.0, 70.0, 55.0]))
            .unwrap();
        assert_eq!(single(&s, "LAmax_Main", params(4).with_max_remove(1)), 65.0);
        assert_eq!(single(&s, "LAmax_Main", params(4)), 70.0);
        assert_eq!(single(&s, "LAmax_Main", params(4).with_max_remove(9)), 55.0);
    }

    #[test]
    fn percentile_rules() {
        let s = TimeSeries::new(minutes(at(0, 0), 4))
            .with_column("LA90_Main", numbers(&[40.0, 41.0, 41.2, 48.0]))
            .unwrap();
        let p = || params(4);
        assert!((single(&s, "LA90_Main", p()) - 42.55).abs() < 1e-9);
        let median = single(&s, "LA90_Main", p().with_avg_type(AverageType::Median));
        assert!((median - 41.1).abs() < 1e-9);
        assert_eq!(single(&s, "LA90_Main", p().with_avg_type(AverageType::Mode)), 41.0);
        assert_eq!(
            single(&s, "LA90_Main", p().with_avg_type(AverageType::LowerQuartile)),
            40.75
        );
    }

    #[test]
    fn other_kinds() {
        let idx = minutes(at(0, 0), 3);
        let ends: Vec<Value> = idx
            .iter()
            .map(|&t| Value::Time(t + Duration::minutes(1)))
            .collect();
        let s = TimeSeries::new(idx.clone())
            .with_column("LAmin_Main", numbers(&[33.0, 31.0, 35.0]))
            .unwrap()
            .with_column("LAE_Main", numbers(&[60.0, 60.0, 60.0]))
            .unwrap()
            .with_column("End_Time", ends)
            .unwrap()
            .with_column("Duration", vec![Value::Span(Duration::minutes(1)); 3])
            .unwrap()
            .with_column("Overload", vec![Value::Null, Value::Number(1.0), Value::Number(2.0)])
            .unwrap();

        let out = Resample::new(params(3)).apply(&s).unwrap().series;
        assert_eq!(out.value(0, "LAmin_Main"), Some(&Value::Number(31.0)));
        let le = out.value(0, "LAE_Main").unwrap().as_f64().unwrap();
        assert!((le - (60.0 + 10.0 * 3f64.log10())).abs() < 1e-9);
        assert_eq!(out.value(0, "End_Time"), Some(&Value::Time(at(0, 3))));
        assert_eq!(
            out.value(0, "Duration"),
            Some(&Value::Span(Duration::minutes(3)))
        );
        assert_eq!(out.value(0, "Overload"), Some(&Value::Number(1.0)));
        assert_eq!(
            out.column_names(),
            ["LAmin_Main", "LAE_Main", "End_Time", "Duration", "Overload", "Missing Samples"]
        );
    }

    #[test]
    fn bins_anchor_at_midnight_and_count_missing() {
        // 00:07 .. 00:21 at 1 min; 15-min bins start at 00:00 and 00:15
        let idx = minutes(at(0, 7), 15);
        let mut values = numbers(&[50.0; 15]);
        values[10] = Value::Null;
        let s = TimeSeries::new(idx)
            .with_column("LAeq_Main", values)
            .unwrap()
            .with_resolution(Resolution::minutes(1));

        let out = Resample::new(params(15)).apply(&s).unwrap();
        assert_eq!(out.series.index(), [at(0, 0), at(0, 15)]);

        let StageReport::MissingSamples(missing) = out.report else {
            panic!("expected missing samples");
        };
        // First bin holds 00:07-00:14 (8 rows), second 00:15-00:21 (7 rows, one null)
        assert_eq!(missing, vec![(at(0, 0), 7.0), (at(0, 15), 9.0)]);
    }

    #[test]
    fn flags_do_not_fill_gaps() {
        use crate::{FlagPeriod, Regularise, TimeWindow};

        // Samples at 00:00 and 00:03; regularising leaves two null rows between
        let raw = TimeSeries::new(vec![at(0, 0), at(0, 3)])
            .with_column("LAeq_Main", numbers(&[50.0, 52.0]))
            .unwrap();
        let grid = Regularise::new(Resolution::minutes(1), false)
            .apply(&raw)
            .unwrap()
            .series;
        let window = TimeWindow::once("Day", at(0, 0), at(23, 59));
        let flagged = FlagPeriod::new(window).apply(&grid).unwrap().series;
        assert!(flagged.has_column("Flag_Day"));

        let stage = Resample::new(params(4));
        for s in [&grid, &flagged] {
            let out = stage.apply(s).unwrap().series;
            assert_eq!(out.value(0, MISSING_SAMPLES), Some(&Value::Number(2.0)));
        }
    }

    #[test]
    fn empty_bins_are_null() {
        let s = TimeSeries::new(vec![at(0, 0), at(2, 0)])
            .with_column("LAeq_Main", numbers(&[50.0, 60.0]))
            .unwrap()
            .with_column("LAE_Main", numbers(&[50.0, 60.0]))
            .unwrap();
        let out = Resample::new(params(60)).apply(&s).unwrap().series;
        assert_eq!(out.len(), 3);
        assert!(out.value(1, "LAeq_Main").unwrap().is_null());
        assert!(out.value(1, "LAE_Main").unwrap().is_null());
    }

    #[test]
    fn coarser_input_has_no_missing_samples() {
        let s = TimeSeries::new(vec![at(0, 0), at(1, 0)])
            .with_column("LAeq_Main", numbers(&[50.0, 60.0]))
            .unwrap()
            .with_resolution(Resolution::hours(1));
        let out = Resample::new(params(15)).apply(&s).unwrap().series;
        assert_eq!(out.len(), 5);
        assert!(
            out.column(MISSING_SAMPLES)
                .unwrap()
                .values
                .iter()
                .all(|v| *v == Value::Number(0.0))
        );
    }

    #[test]
    fn from_args_validates_before_running() {
        let args = |avg: &str, leq: &str| -> Vec<String> {
            ["1H", "10", avg, "A", "[10.0, 90.0]", leq]
                .iter()
                .map(|s| s.to_string())
                .collect()
        };
        let stage = Resample::from_args(&args("lq", "log")).unwrap();
        assert_eq!(stage.params().avg_type, AverageType::LowerQuartile);
        assert_eq!(stage.params().max_remove, 10);
        assert_eq!(stage.params().percentiles, vec![10, 90]);

        assert_eq!(
            Resample::from_args(&args("avg", "log")).unwrap_err(),
            Error::InvalidAverageType("avg".into())
        );
        assert_eq!(
            Resample::from_args(&args("mean", "energy")).unwrap_err(),
            Error::InvalidLeqMode("energy".into())
        );
    }
}
