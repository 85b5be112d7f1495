//! Daily and whole-survey summary tables.
//!
//! The builder runs the resampler once per window at a resolution of one
//! day. Windows that cross midnight would be split across two calendar days,
//! so each window's samples are first shifted back by the window's start
//! time of day, binned, then shifted forward again. A `23:00-07:00` night
//! therefore lands in a single daily bin dated by the evening it began.
//!
//! Day rows are collapsed per window into three survey rows: the mean of the
//! days, the maximum of the days, and the lowest mode of the whole-dB
//! rounded days.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use noisedp_core::{
    Column, Error, Metadata, MetricKind, MetricSchema, Resolution, Result, Stage, TimeSeries,
    Value, flag_column_name, lowest_mode, main_column_name, mean, window_name,
};
use noisedp_process::{AverageType, Bins, LeqMode, Resample, ResampleParams};
use tracing::{debug, info, warn};

use crate::spectrum::{MatchMode, SpectrumMatcher};
use crate::table::{
    MAX_LABEL, MEAN_LABEL, MODE_LABEL, SummaryRow, SummaryTable, USER_LABEL, weekday_name,
};

/// Window used when the series carries no flags.
pub const DEFAULT_WINDOW: &str = "24hr_Day";

/// Every table produced for a survey.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurveyTables {
    /// Windows that contributed at least one sample, in flag order.
    pub windows: Vec<String>,
    /// Broadband metrics per day and window.
    pub main: SummaryTable,
    /// Mean of [`main`](Self::main) per window.
    pub main_mean: SummaryTable,
    /// Maximum of [`main`](Self::main) per window.
    pub main_max: SummaryTable,
    /// Lowest mode of [`main`](Self::main) per window.
    pub main_mode: SummaryTable,
    /// Leq spectra per day and window.
    pub leq_spectra: SummaryTable,
    /// Mean Leq spectra per window.
    pub leq_spectra_mean: SummaryTable,
    /// Maximum Leq spectra per window.
    pub leq_spectra_max: SummaryTable,
    /// Lowest-mode Leq spectra per window.
    pub leq_spectra_mode: SummaryTable,
    /// Representative Lmax spectra per day and window.
    pub lmax_spectra: SummaryTable,
    /// Lmax spectra matched to [`main_mean`](Self::main_mean).
    pub lmax_spectra_mean: SummaryTable,
    /// Lmax spectra matched to [`main_max`](Self::main_max).
    pub lmax_spectra_max: SummaryTable,
    /// Lmax spectra matched to [`main_mode`](Self::main_mode).
    pub lmax_spectra_mode: SummaryTable,
    /// Lmax spectra matched to user-defined peak values.
    pub lmax_spectra_user: SummaryTable,
}

impl SurveyTables {
    /// All tables with stable file-friendly names.
    pub fn named(&self) -> Vec<(&'static str, &SummaryTable)> {
        vec![
            ("main", &self.main),
            ("main_mean", &self.main_mean),
            ("main_max", &self.main_max),
            ("main_mode", &self.main_mode),
            ("leq_spectra", &self.leq_spectra),
            ("leq_spectra_mean", &self.leq_spectra_mean),
            ("leq_spectra_max", &self.leq_spectra_max),
            ("leq_spectra_mode", &self.leq_spectra_mode),
            ("lmax_spectra", &self.lmax_spectra),
            ("lmax_spectra_mean", &self.lmax_spectra_mean),
            ("lmax_spectra_max", &self.lmax_spectra_max),
            ("lmax_spectra_mode", &self.lmax_spectra_mode),
            ("lmax_spectra_user", &self.lmax_spectra_user),
        ]
    }
}

/// Summary table builder.
///
/// # Example
///
/// ```rust
/// use noisedp_analysis::TableBuilder;
/// use noisedp_core::Metadata;
///
/// let meta = Metadata::new('A', vec![10, 90]).unwrap();
/// let builder = TableBuilder::new(&meta)
///     .with_max_remove(10)
///     .with_override("Night-time", 54.0);
/// assert_eq!(builder.max_remove(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableBuilder {
    weighting: char,
    percentiles: Vec<u32>,
    max_remove: usize,
    overrides: BTreeMap<String, f64>,
}

/// Metric columns of the daily table and where each value comes from.
struct Layout {
    leq: String,
    /// Broadband columns taken from the mean pass, in table order.
    plain: Vec<String>,
    /// Percentile columns resampled three ways.
    percentiles: Vec<String>,
    leq_bands: Vec<String>,
}

impl Layout {
    fn main_columns(&self) -> Vec<String> {
        let mut cols = self.plain.clone();
        for p in &self.percentiles {
            for avg in [AverageType::Mean, AverageType::Mode, AverageType::LowerQuartile] {
                cols.push(format!("{p}_{avg}"));
            }
        }
        cols
    }

    fn source_columns(&self) -> Vec<String> {
        let mut cols = self.plain.clone();
        cols.extend(self.percentiles.iter().cloned());
        cols.extend(self.leq_bands.iter().cloned());
        cols
    }
}

impl TableBuilder {
    /// Name used in error messages.
    pub const NAME: &'static str = "Table builder";

    /// Builder for a survey's weighting and percentiles.
    pub fn new(metadata: &Metadata) -> Self {
        Self {
            weighting: metadata.frequency_weighting(),
            percentiles: metadata.percentiles().to_vec(),
            max_remove: 0,
            overrides: BTreeMap::new(),
        }
    }

    /// Number of highest Lmax samples ignored per day.
    pub fn with_max_remove(mut self, max_remove: usize) -> Self {
        self.max_remove = max_remove;
        self
    }

    /// User-defined Lmax for a window's representative spectrum.
    pub fn with_override(mut self, window: impl Into<String>, lmax: f64) -> Self {
        self.overrides.insert(window.into(), lmax);
        self
    }

    /// Replace all user-defined Lmax values.
    pub fn with_overrides(mut self, overrides: BTreeMap<String, f64>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Lmax trim count.
    pub fn max_remove(&self) -> usize {
        self.max_remove
    }

    fn layout(&self, series: &TimeSeries) -> Result<Layout> {
        let w = self.weighting;
        let leq = main_column_name(MetricKind::Leq, w);
        if !series.has_column(&leq) {
            return Err(Error::missing_column(Self::NAME, leq));
        }

        let mut plain = vec![leq.clone()];
        let lmax = main_column_name(MetricKind::Lmax, w);
        if series.has_column(&lmax) {
            plain.push(lmax);
        }

        let percentiles = self
            .percentiles
            .iter()
            .map(|&p| main_column_name(MetricKind::Percentile(p), w))
            .filter(|c| series.has_column(c))
            .collect();

        let schema = MetricSchema::classify(series.column_names(), w, &self.percentiles);
        let leq_bands = schema
            .of_kind(MetricKind::Leq)
            .filter(|d| d.band_hz.is_some())
            .map(|d| d.name.clone())
            .collect();

        Ok(Layout {
            leq,
            plain,
            percentiles,
            leq_bands,
        })
    }

    /// Series with a default whole-day window when no flags exist.
    fn with_default_window(series: &TimeSeries) -> Result<TimeSeries> {
        if !series.flag_columns().is_empty() {
            return Ok(series.clone());
        }
        let mut out = series.clone();
        let midnight = series
            .index()
            .iter()
            .min()
            .map(|t| t.date().and_time(NaiveTime::MIN));
        let values = vec![midnight.map_or(Value::Null, Value::Time); series.len()];
        out.push_column(Column::new(flag_column_name(DEFAULT_WINDOW), values))?;
        Ok(out)
    }

    fn resample(&self, series: &TimeSeries, avg_type: AverageType) -> Result<TimeSeries> {
        let params = ResampleParams::new(Resolution::days(1), self.weighting, self.percentiles.clone())
            .with_max_remove(self.max_remove)
            .with_avg_type(avg_type)
            .with_leq_mode(LeqMode::Log);
        Ok(Resample::new(params).apply(series)?.series)
    }

    /// Day rows of one window, keyed by the timestamp of their first sample.
    fn window_days(
        &self,
        series: &TimeSeries,
        window: &str,
        layout: &Layout,
        sample: Duration,
    ) -> Result<Vec<(NaiveDateTime, SummaryRow)>> {
        let Some(flag) = series.column(&flag_column_name(window)) else {
            return Ok(Vec::new());
        };

        // Group flagged rows by window start time, in order of first appearance
        let mut groups: Vec<(NaiveTime, Vec<usize>)> = Vec::new();
        for (row, v) in flag.values.iter().enumerate() {
            let Some(start) = v.as_time() else { continue };
            let tod = start.time();
            match groups.iter_mut().find(|(t, _)| *t == tod) {
                Some((_, rows)) => rows.push(row),
                None => groups.push((tod, vec![row])),
            }
        }

        let sources = layout.source_columns();
        let mut days = Vec::new();
        for (tod, rows) in groups {
            let offset = tod - NaiveTime::MIN;
            let shifted = series
                .select_rows(&rows)
                .select_columns(&sources)
                .shift_index(-offset);

            let by_mean = self.resample(&shifted, AverageType::Mean)?;
            let (by_mode, by_lq) = if layout.percentiles.is_empty() {
                (TimeSeries::default(), TimeSeries::default())
            } else {
                let pct = shifted.select_columns(&layout.percentiles);
                (
                    self.resample(&pct, AverageType::Mode)?,
                    self.resample(&pct, AverageType::LowerQuartile)?,
                )
            };

            let bins = Bins::new(shifted.index(), Resolution::days(1));
            for (b, members) in bins.rows.iter().enumerate() {
                let (Some(&first), Some(&last)) = (
                    members.iter().map(|&r| &shifted.index()[r]).min(),
                    members.iter().map(|&r| &shifted.index()[r]).max(),
                ) else {
                    continue;
                };
                let (first, last) = (first + offset, last + offset);
                let date = bins.starts[b].date();

                let pick = |s: &TimeSeries, col: &str| s.value(b, col).cloned().unwrap_or_default();
                let mut values: Vec<Value> =
                    layout.plain.iter().map(|c| pick(&by_mean, c)).collect();
                for p in &layout.percentiles {
                    values.push(pick(&by_mean, p));
                    values.push(pick(&by_mode, p));
                    values.push(pick(&by_lq, p));
                }
                values.extend(layout.leq_bands.iter().map(|c| pick(&by_mean, c)));

                days.push((
                    first,
                    SummaryRow {
                        date: Some(date),
                        label: weekday_name(date.weekday()).to_string(),
                        window: window.to_string(),
                        start: Some(first.time()),
                        end: Some((last + sample).time()),
                        values,
                    },
                ));
            }
            debug!(window, start = %tod, days = bins.len(), "summarised window by day");
        }
        Ok(days)
    }

    /// Collapse one window's day rows into mean, max and lowest-mode rows.
    fn survey_rows(
        window: &str,
        days: &[&SummaryRow],
        columns: usize,
    ) -> Option<[SummaryRow; 3]> {
        if days.is_empty() {
            return None;
        }
        let start = lowest_modal(days.iter().filter_map(|r| r.start));
        let end = lowest_modal(days.iter().filter_map(|r| r.end));

        let column = |i: usize| -> Vec<f64> { days.iter().filter_map(|r| r.values[i].as_f64()).collect() };
        let aggregate = |f: fn(&[f64]) -> Option<f64>| -> Vec<Value> {
            (0..columns).map(|i| Value::from_option(f(&column(i)))).collect()
        };
        let row = |label: &str, values: Vec<Value>| SummaryRow {
            date: None,
            label: label.to_string(),
            window: window.to_string(),
            start,
            end,
            values,
        };

        Some([
            row(MEAN_LABEL, aggregate(mean)),
            row(MAX_LABEL, aggregate(|v| v.iter().copied().reduce(f64::max))),
            row(MODE_LABEL, aggregate(lowest_mode)),
        ])
    }

    /// Build the full table set.
    ///
    /// # Errors
    ///
    /// Fails if the series has no broadband Leq column for the weighting.
    pub fn build(&self, series: &TimeSeries) -> Result<SurveyTables> {
        let layout = self.layout(series)?;
        let working = Self::with_default_window(series)?;
        let sample = working
            .resolution()
            .map_or_else(Duration::zero, Resolution::as_duration);

        let all_windows: Vec<String> = working
            .flag_columns()
            .into_iter()
            .filter_map(window_name)
            .map(String::from)
            .collect();

        // Thread the day rows and surviving windows through the window loop
        let (mut keyed, windows) = all_windows.iter().try_fold(
            (Vec::new(), Vec::new()),
            |(mut keyed, mut windows), window| -> Result<_> {
                let days = self.window_days(&working, window, &layout, sample)?;
                if days.is_empty() {
                    warn!(window = %window, "no samples flagged, skipping window");
                } else {
                    keyed.extend(days);
                    windows.push(window.clone());
                }
                Ok((keyed, windows))
            },
        )?;

        keyed.sort_by_key(|(first, _)| *first);
        let main_cols = layout.main_columns();
        let mut columns = main_cols.clone();
        columns.extend(layout.leq_bands.iter().cloned());

        let mut daily = SummaryTable::new(columns.clone());
        daily.rows = keyed
            .into_iter()
            .map(|(_, row)| row)
            .filter(|row| !row.has_null())
            .collect();

        let (mut mean_t, mut max_t, mut mode_t) = (
            SummaryTable::new(columns.clone()),
            SummaryTable::new(columns.clone()),
            SummaryTable::new(columns.clone()),
        );
        for window in &windows {
            let days: Vec<&SummaryRow> = daily.rows_for(window).collect();
            match Self::survey_rows(window, &days, columns.len()) {
                Some([m, x, o]) => {
                    mean_t.rows.push(m);
                    max_t.rows.push(x);
                    mode_t.rows.push(o);
                }
                None => warn!(window = %window, "no complete days, skipping survey rows"),
            }
        }

        let mut spec_cols = layout.leq_bands.clone();
        spec_cols.push(layout.leq.clone());
        let spectral = working
            .column_names()
            .iter()
            .any(|c| noisedp_core::band_frequency(c).is_some());

        let mut tables = SurveyTables {
            windows: windows.clone(),
            main: daily.select(&main_cols),
            main_mean: mean_t.select(&main_cols),
            main_max: max_t.select(&main_cols),
            main_mode: mode_t.select(&main_cols),
            ..SurveyTables::default()
        };

        if spectral {
            tables.leq_spectra = daily.select(&spec_cols);
            tables.leq_spectra_mean = mean_t.select(&spec_cols);
            tables.leq_spectra_max = max_t.select(&spec_cols);
            tables.leq_spectra_mode = mode_t.select(&spec_cols);

            let lmax = main_column_name(MetricKind::Lmax, self.weighting);
            if working.has_column(&lmax) {
                let matcher = SpectrumMatcher::new(self.weighting);
                let none = BTreeMap::new();
                let matched = |table: &SummaryTable, mode, overrides: &BTreeMap<String, f64>| {
                    matcher.match_table(&working, table, &windows, mode, overrides)
                };
                tables.lmax_spectra = matched(&tables.main, MatchMode::Daily, &none)?;
                tables.lmax_spectra_mean = matched(&tables.main_mean, MatchMode::Survey, &none)?;
                tables.lmax_spectra_max = matched(&tables.main_max, MatchMode::Survey, &none)?;
                tables.lmax_spectra_mode = matched(&tables.main_mode, MatchMode::Survey, &none)?;

                if !self.overrides.is_empty() {
                    let mut user = matched(&tables.main_mean, MatchMode::Survey, &self.overrides)?;
                    for row in &mut user.rows {
                        row.label = USER_LABEL.to_string();
                    }
                    tables.lmax_spectra_user = user;
                }
            }
        }

        info!(
            windows = windows.len(),
            days = tables.main.len(),
            spectral,
            "built summary tables"
        );
        Ok(tables)
    }
}

/// Most frequent value, smallest on ties.
fn lowest_modal<T: Ord + Copy>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    // BTreeMap iterates ascending; strict > keeps the smallest tie
    let mut best: Option<(T, usize)> = None;
    for (v, n) in counts {
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((v, n));
        }
    }
    best.map(|(v, _)| v)
}
