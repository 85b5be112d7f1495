//! Period flagging.
//!
//! A window is `(name, start, end, recurrence)`. Each row gets a
//! `Flag_<name>` cell holding the window's start timestamp when the row is
//! inside the window, null otherwise.
//!
//! # Membership
//!
//! | Recurrence | Times | Row `t` is flagged when |
//! |------------|-------|-------------------------|
//! | none | any | `start <= t < end` |
//! | days | `end > start` | weekday in days and `start <= t.time() < end` |
//! | days | `end <= start` | weekday in days and (`t.time() >= start` or `t.time() < end`) |
//!
//! The overnight case tests the weekday of the row itself. A `23:00-07:00`
//! window on Saturday flags Saturday `[00:00, 07:00)` and `[23:00, 24:00)`,
//! not the following Sunday morning. Define an extra window to cover it.

use chrono::{Datelike, NaiveDateTime, Weekday};
use noisedp_core::{
    Column, Error, FlaggedRows, Result, Stage, StageOutput, StageReport, TimeSeries, Value,
    flag_column_name,
};
use tracing::debug;

use crate::args::{expect_count, parse_recurrence, parse_time};

/// A named time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    /// Window name; the flag column is `Flag_<name>`.
    pub name: String,
    /// Start of the first occurrence.
    pub start: NaiveDateTime,
    /// End of the first occurrence.
    pub end: NaiveDateTime,
    /// Weekdays the window recurs on; `None` for a one-off interval.
    pub recurrence: Option<Vec<Weekday>>,
}

impl TimeWindow {
    /// One-off window `[start, end)`.
    pub fn once(name: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            recurrence: None,
        }
    }

    /// Window recurring on the given weekdays.
    pub fn recurring(
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        days: Vec<Weekday>,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            recurrence: Some(days),
        }
    }

    /// Whether the window crosses midnight.
    pub fn is_overnight(&self) -> bool {
        self.end.time() <= self.start.time()
    }

    /// Whether timestamp `t` falls in the window.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        let Some(days) = &self.recurrence else {
            return self.start <= t && t < self.end;
        };
        if !days.contains(&t.weekday()) {
            return false;
        }
        let (time, start, end) = (t.time(), self.start.time(), self.end.time());
        if self.is_overnight() {
            time >= start || time < end
        } else {
            start <= time && time < end
        }
    }
}

/// Flag time stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagPeriod {
    window: TimeWindow,
}

impl FlagPeriod {
    /// Stage name used in pipeline configuration.
    pub const NAME: &'static str = "Flag time";

    /// Create the stage.
    pub fn new(window: TimeWindow) -> Self {
        Self { window }
    }

    /// Build from `[name, start, end, recurrence]`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        expect_count(Self::NAME, args, 4, 4)?;
        let name = args[0].trim();
        if name.is_empty() {
            return Err(Error::invalid_argument(Self::NAME, &args[0], "empty window name"));
        }
        let start = parse_time(Self::NAME, &args[1])?;
        let end = parse_time(Self::NAME, &args[2])?;
        let recurrence = parse_recurrence(&args[3])?;
        if recurrence.is_none() && end <= start {
            return Err(Error::invalid_argument(
                Self::NAME,
                &args[2],
                "end must be after start for a one-off window",
            ));
        }
        Ok(Self::new(TimeWindow {
            name: name.to_string(),
            start,
            end,
            recurrence,
        }))
    }

    /// The window being flagged.
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }
}

impl Stage for FlagPeriod {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, series: &TimeSeries) -> Result<StageOutput> {
        let column = flag_column_name(&self.window.name);
        let previous = series.column(&column).map(|c| c.values.as_slice());

        let mut matched = 0;
        let values: Vec<Value> = series
            .index()
            .iter()
            .enumerate()
            .map(|(row, &t)| {
                if self.window.contains(t) {
                    matched += 1;
                    Value::Time(self.window.start)
                } else {
                    previous.map_or(Value::Null, |p| p[row].clone())
                }
            })
            .collect();

        let mut out = series.clone();
        out.push_column(Column::new(column, values))?;
        debug!(window = %self.window.name, rows = matched, "flagged window");

        Ok(StageOutput::new(out).with_report(StageReport::Flagged(FlaggedRows {
            window: self.window.name.clone(),
            rows: matched,
        })))
    }
}
