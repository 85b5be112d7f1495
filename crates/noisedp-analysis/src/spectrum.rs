//! Representative Lmax spectrum selection.
//!
//! A summary table reports a single broadband Lmax per day (or per survey)
//! and window. To give that number a spectral shape, the matcher looks up
//! every sample in the window whose broadband Lmax rounds to the same whole
//! dB, averages their narrow-band spectra (125 Hz - 4 kHz), and picks the
//! sample closest to that average in the least-squares sense:
//!
//! ```text
//! mean_b  = mean over candidates of L_b
//! score_i = Σ_b (L_{i,b} - mean_b)²
//! match   = argmin_i score_i   (ties: first candidate in series order)
//! ```
//!
//! For daily tables candidates must also fall on the table row's day, where
//! a sample's day is taken after shifting it back by its window's start time
//! so overnight windows stay on the evening they began.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use noisedp_core::{
    Error, MetricKind, MetricSchema, Result, TimeSeries, Value, flag_column_name,
    main_column_name, round_half_even,
};
use tracing::{debug, warn};

use crate::table::{SummaryRow, SummaryTable};

/// Which kind of table is being matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// One row per day and window; candidates must share the row's day.
    Daily,
    /// One row per window over the whole survey.
    Survey,
}

/// Least-squares spectrum matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumMatcher {
    weighting: char,
    low_hz: f64,
    high_hz: f64,
}

impl SpectrumMatcher {
    /// Name used in error messages.
    pub const NAME: &'static str = "Spectrum matcher";

    /// Matcher over the default 125 Hz - 4 kHz band range.
    pub fn new(weighting: char) -> Self {
        Self {
            weighting,
            low_hz: 125.0,
            high_hz: 4000.0,
        }
    }

    /// Override the narrow-band range (inclusive).
    pub fn with_band_range(mut self, low_hz: f64, high_hz: f64) -> Self {
        self.low_hz = low_hz;
        self.high_hz = high_hz;
        self
    }

    fn lmax_main(&self) -> String {
        main_column_name(MetricKind::Lmax, self.weighting)
    }

    /// Output columns: every Lmax column of the series with the broadband
    /// column moved last.
    pub fn lmax_columns(&self, series: &TimeSeries) -> Vec<String> {
        let main = self.lmax_main();
        let schema = MetricSchema::classify(series.column_names(), self.weighting, &[]);
        let mut cols: Vec<String> = schema
            .of_kind(MetricKind::Lmax)
            .map(|d| d.name.clone())
            .filter(|c| *c != main)
            .collect();
        if series.has_column(&main) {
            cols.push(main);
        }
        cols
    }

    /// Lmax band columns inside the narrow-band range, in column order.
    pub fn narrow_bands(&self, series: &TimeSeries) -> Vec<String> {
        let schema = MetricSchema::classify(series.column_names(), self.weighting, &[]);
        schema
            .of_kind(MetricKind::Lmax)
            .filter(|d| {
                d.band_hz
                    .is_some_and(|f| (self.low_hz..=self.high_hz).contains(&f))
            })
            .map(|d| d.name.clone())
            .collect()
    }

    /// Build a table of representative Lmax spectra for `table`.
    ///
    /// `overrides` replaces the table's peak value per window before
    /// matching; it is only honoured in [`MatchMode::Survey`].
    ///
    /// # Errors
    ///
    /// Fails if the series has no broadband Lmax column, the table has no
    /// Lmax column, or a window has no flag column.
    pub fn match_table(
        &self,
        series: &TimeSeries,
        table: &SummaryTable,
        windows: &[String],
        mode: MatchMode,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<SummaryTable> {
        let main = self.lmax_main();
        let levels = series
            .numeric(&main)
            .ok_or_else(|| Error::missing_column(Self::NAME, &main))?;
        let peak_col = table
            .column_index(&main)
            .ok_or_else(|| Error::missing_column(Self::NAME, &main))?;

        let out_cols = self.lmax_columns(series);
        let narrow: Vec<Vec<Option<f64>>> = self
            .narrow_bands(series)
            .iter()
            .filter_map(|c| series.numeric(c))
            .collect();

        let mut out = SummaryTable::new(out_cols.clone());
        for window in windows {
            let flag_name = flag_column_name(window);
            let flag = series
                .column(&flag_name)
                .ok_or_else(|| Error::missing_column(Self::NAME, &flag_name))?;

            // (row, rounded Lmax, shifted day) for every flagged sample
            let candidates: Vec<(usize, f64, NaiveDate)> = flag
                .values
                .iter()
                .enumerate()
                .filter_map(|(row, v)| {
                    let start = v.as_time()?;
                    let level = levels[row]?;
                    let offset = start.time() - NaiveTime::MIN;
                    let day = (series.index()[row] - offset).date();
                    Some((row, round_half_even(level), day))
                })
                .collect();

            let peak_override = match mode {
                MatchMode::Survey => overrides.get(window).copied(),
                MatchMode::Daily => None,
            };

            for row in table.rows_for(window) {
                let peak = peak_override.or_else(|| row.values[peak_col].as_f64());
                let matched = peak.map(round_half_even).and_then(|target| {
                    let pool: Vec<usize> = candidates
                        .iter()
                        .filter(|(_, level, day)| {
                            *level == target
                                && (mode == MatchMode::Survey || Some(*day) == row.date)
                        })
                        .map(|&(r, _, _)| r)
                        .collect();
                    closest(&pool, &narrow)
                });

                let values = match matched {
                    Some(r) => out_cols
                        .iter()
                        .map(|c| series.value(r, c).cloned().unwrap_or_default())
                        .collect(),
                    None => {
                        warn!(window = %window, peak = ?peak, "no sample matches table Lmax");
                        vec![Value::Null; out_cols.len()]
                    }
                };
                debug!(window = %window, row = ?matched, "matched Lmax spectrum");

                out.rows.push(SummaryRow {
                    values,
                    ..row.clone()
                });
            }
        }

        if mode == MatchMode::Daily {
            out.rows.sort_by_key(|r| (r.date, r.start));
        }
        Ok(out)
    }
}

/// Candidate whose narrow-band spectrum is closest to the pool mean.
fn closest(pool: &[usize], bands: &[Vec<Option<f64>>]) -> Option<usize> {
    let means: Vec<Option<f64>> = bands
        .iter()
        .map(|band| {
            let vals: Vec<f64> = pool.iter().filter_map(|&r| band[r]).collect();
            noisedp_core::mean(&vals)
        })
        .collect();

    let score = |r: usize| -> f64 {
        bands
            .iter()
            .zip(&means)
            .filter_map(|(band, mean)| Some((band[r]? - (*mean)?).powi(2)))
            .sum()
    };

    let mut best: Option<(usize, f64)> = None;
    for &r in pool {
        let s = score(r);
        if best.is_none_or(|(_, b)| s < b) {
            best = Some((r, s));
        }
    }
    best.map(|(r, _)| r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    /// Four samples in one window; rows 1 and 3 share a rounded Lmax of 70.
    fn series() -> TimeSeries {
        let index: Vec<_> = (0..4).map(|i| at(1, 8) + Duration::hours(i)).collect();
        let n = |v: &[f64]| v.iter().map(|&x| Value::Number(x)).collect::<Vec<_>>();
        TimeSeries::new(index)
            .with_column("LAmax_Main", n(&[65.0, 69.6, 60.0, 70.2]))
            .unwrap()
            .with_column("LAmax_63_Hz", n(&[50.0, 51.0, 52.0, 53.0]))
            .unwrap()
            .with_column("LAmax_125_Hz", n(&[40.0, 40.0, 40.0, 44.0]))
            .unwrap()
            .with_column("LAmax_1000_Hz", n(&[60.0, 61.0, 60.0, 60.0]))
            .unwrap()
            .with_column("Flag_Day", vec![Value::Time(at(1, 7)); 4])
            .unwrap()
    }

    fn table(date: Option<NaiveDate>, lmax: f64) -> SummaryTable {
        let mut t = SummaryTable::new(vec!["LAmax_Main".into()]);
        t.rows.push(SummaryRow {
            date,
            label: "Monday".into(),
            window: "Day".into(),
            start: NaiveTime::from_hms_opt(7, 0, 0),
            end: NaiveTime::from_hms_opt(19, 0, 0),
            values: vec![Value::Number(lmax)],
        });
        t
    }

    #[test]
    fn columns_put_main_last_and_filter_narrow_band() {
        let m = SpectrumMatcher::new('A');
        let s = series();
        assert_eq!(
            m.lmax_columns(&s),
            ["LAmax_63_Hz", "LAmax_125_Hz", "LAmax_1000_Hz", "LAmax_Main"]
        );
        assert_eq!(m.narrow_bands(&s), ["LAmax_125_Hz", "LAmax_1000_Hz"]);
    }

    #[test]
    fn picks_least_squares_candidate() {
        // Candidates rows 1 and 3: mean = (42, 60.5); scores 4.25 and 4.25 -> tie to row 1
        let out = SpectrumMatcher::new('A')
            .match_table(
                &series(),
                &table(None, 70.4),
                &["Day".to_string()],
                MatchMode::Survey,
                &BTreeMap::new(),
            )
            .unwrap();
        assert_eq!(out.number(0, "LAmax_Main"), Some(69.6));
        assert_eq!(out.number(0, "LAmax_63_Hz"), Some(51.0));
    }

    #[test]
    fn closest_prefers_smaller_score() {
        let bands = vec![
            vec![Some(40.0), Some(50.0), Some(41.0)],
            vec![Some(60.0), Some(60.0), Some(61.0)],
        ];
        // Mean (43.67, 60.33): row 0 scores 13.4+0.1, row 2 7.1+0.4, row 1 40.1+0.1
        assert_eq!(closest(&[0, 1, 2], &bands), Some(2));
        assert_eq!(closest(&[], &bands), None);
    }

    #[test]
    fn override_replaces_peak_in_survey_mode() {
        let overrides = BTreeMap::from([("Day".to_string(), 65.0)]);
        let out = SpectrumMatcher::new('A')
            .match_table(
                &series(),
                &table(None, 70.0),
                &["Day".to_string()],
                MatchMode::Survey,
                &overrides,
            )
            .unwrap();
        assert_eq!(out.number(0, "LAmax_Main"), Some(65.0));
    }

    #[test]
    fn daily_mode_requires_same_day() {
        let other_day = NaiveDate::from_ymd_opt(2024, 7, 2);
        let out = SpectrumMatcher::new('A')
            .match_table(
                &series(),
                &table(other_day, 70.0),
                &["Day".to_string()],
                MatchMode::Daily,
                &BTreeMap::new(),
            )
            .unwrap();
        assert!(out.rows[0].has_null());
        assert_eq!(out.rows[0].label, "Monday");

        let same_day = NaiveDate::from_ymd_opt(2024, 7, 1);
        let out = SpectrumMatcher::new('A')
            .match_table(
                &series(),
                &table(same_day, 70.0),
                &["Day".to_string()],
                MatchMode::Daily,
                &BTreeMap::new(),
            )
            .unwrap();
        assert!(!out.rows[0].has_null());
    }

    #[test]
    fn missing_flag_is_an_error() {
        let err = SpectrumMatcher::new('A')
            .match_table(
                &series(),
                &table(None, 70.0),
                &["Night".to_string()],
                MatchMode::Survey,
                &BTreeMap::new(),
            )
            .unwrap_err();
        assert_eq!(err, Error::missing_column("Spectrum matcher", "Flag_Night"));
    }
}
