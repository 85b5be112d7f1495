//! Snap an irregular series onto a fixed sampling grid.
//!
//! Loggers drift: a nominal 5-minute survey arrives with timestamps a few
//! seconds either side of the grid, the occasional doubled sample, and gaps
//! where the instrument was down. Regularising makes the index exact:
//!
//! 1. Round every timestamp to the nearest multiple of the resolution
//! 2. Drop **every** row whose rounded timestamp collides with another
//!    (there is no way to tell which of them is right)
//! 3. Reindex onto the full grid from first to last timestamp, leaving gaps
//!    as null rows
//! 4. Optionally trim the first and last grid rows (partial intervals)

use std::collections::HashMap;

use chrono::NaiveDateTime;
use noisedp_core::{Column, Resolution, Result, Stage, StageOutput, StageReport, TimeSeries, Value};
use tracing::warn;

use crate::args::{expect_count, parse_bool, parse_resolution};

/// Regularise stage.
///
/// # Example
///
/// ```rust
/// use noisedp_core::{Resolution, Stage};
/// use noisedp_process::Regularise;
///
/// let stage = Regularise::new(Resolution::minutes(5), false);
/// assert_eq!(stage.name(), "Regularise");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Regularise {
    resolution: Resolution,
    trim_ends: bool,
}

impl Regularise {
    /// Stage name used in pipeline configuration.
    pub const NAME: &'static str = "Regularise";

    /// Create the stage.
    pub fn new(resolution: Resolution, trim_ends: bool) -> Self {
        Self {
            resolution,
            trim_ends,
        }
    }

    /// Build from `[resolution, trim_ends?]`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        expect_count(Self::NAME, args, 1, 2)?;
        let resolution = parse_resolution(Self::NAME, &args[0])?;
        let trim_ends = match args.get(1) {
            Some(s) => parse_bool(Self::NAME, s)?,
            None => false,
        };
        Ok(Self::new(resolution, trim_ends))
    }

    /// Target resolution.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Whether the first and last grid rows are dropped.
    pub fn trim_ends(&self) -> bool {
        self.trim_ends
    }
}

impl Stage for Regularise {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, series: &TimeSeries) -> Result<StageOutput> {
        let res = self.resolution;
        let rounded: Vec<NaiveDateTime> = series.index().iter().map(|&t| res.round(t)).collect();

        let mut counts: HashMap<NaiveDateTime, usize> = HashMap::new();
        for &t in &rounded {
            *counts.entry(t).or_default() += 1;
        }

        // Rounded timestamp -> surviving source row
        let rows: HashMap<NaiveDateTime, usize> = rounded
            .iter()
            .enumerate()
            .filter(|(_, t)| counts[*t] == 1)
            .map(|(i, &t)| (t, i))
            .collect();
        let dropped = series.len() - rows.len();
        if dropped > 0 {
            warn!(dropped, resolution = %res, "dropped rows with colliding timestamps");
        }

        let mut grid = match (rows.keys().min(), rows.keys().max()) {
            (Some(&first), Some(&last)) => {
                let mut grid = Vec::new();
                let mut t = first;
                while t <= last {
                    grid.push(t);
                    t += res.as_duration();
                }
                grid
            }
            _ => Vec::new(),
        };

        if self.trim_ends {
            if grid.len() < 3 {
                grid.clear();
            } else {
                grid.pop();
                grid.remove(0);
            }
        }

        let columns = series
            .columns()
            .iter()
            .map(|c| {
                let values = grid
                    .iter()
                    .map(|t| rows.get(t).map_or(Value::Null, |&r| c.values[r].clone()))
                    .collect();
                Column::new(&c.name, values)
            })
            .collect();

        let out = TimeSeries::from_parts(grid, columns, Some(res))?;
        Ok(StageOutput::new(out).with_report(StageReport::DuplicatesDropped(dropped)))
    }
}
