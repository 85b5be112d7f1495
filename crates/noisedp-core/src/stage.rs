//! Core Stage trait and stage diagnostics.
//!
//! A [`Stage`] consumes a series and returns a new one. Stages are
//! constructed from string arguments by the registry, so they carry their
//! parsed parameters and have no mutable state.
//!
//! ## Design Decisions
//!
//! - **Pure**: `apply` takes `&self` and `&TimeSeries`. The input series is
//!   left untouched and stages can be re-run.
//!
//! - **Object-safe**: pipelines hold `Box<dyn Stage>` built at runtime from
//!   configuration.
//!
//! - **Diagnostics are data**: non-fatal findings (dropped duplicates, nulled
//!   rows, octave provenance) travel in a [`StageReport`] next to the output.

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::series::TimeSeries;

/// A processing stage of a survey pipeline.
///
/// # Example
///
/// ```rust
/// use noisedp_core::{Result, Stage, StageOutput, TimeSeries};
///
/// struct Identity;
///
/// impl Stage for Identity {
///     fn name(&self) -> &str {
///         "Identity"
///     }
///
///     fn apply(&self, series: &TimeSeries) -> Result<StageOutput> {
///         Ok(StageOutput::new(series.clone()))
///     }
/// }
///
/// let out = Identity.apply(&TimeSeries::default()).unwrap();
/// assert!(out.series.is_empty());
/// ```
pub trait Stage {
    /// Stage name as used in pipeline configuration.
    fn name(&self) -> &str;

    /// Run the stage over a series.
    fn apply(&self, series: &TimeSeries) -> Result<StageOutput>;
}

/// Result of applying a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    /// Transformed series.
    pub series: TimeSeries,
    /// Auxiliary diagnostics.
    pub report: StageReport,
}

impl StageOutput {
    /// Output with no report.
    pub fn new(series: TimeSeries) -> Self {
        Self {
            series,
            report: StageReport::None,
        }
    }

    /// Attach a report.
    pub fn with_report(mut self, report: StageReport) -> Self {
        self.report = report;
        self
    }
}

/// Provenance of one reduced octave band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctaveProvenance {
    /// Metric stem, e.g. `LAeq`.
    pub metric: String,
    /// Surviving (centre) column.
    pub output_band: String,
    /// The three folded third-octave columns, ascending.
    pub inputs: [String; 3],
}

/// Rows matched by one window definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedRows {
    /// Window name.
    pub window: String,
    /// Number of rows matched.
    pub rows: usize,
}

/// Non-fatal diagnostics produced by a stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StageReport {
    /// Nothing to report.
    #[default]
    None,
    /// Rows dropped because their rounded timestamps collided.
    DuplicatesDropped(usize),
    /// Rows nulled because they fell outside every kept window.
    RowsRemoved(usize),
    /// Octave bands produced and their sources.
    Octaves(Vec<OctaveProvenance>),
    /// Missing sample count per output bin.
    MissingSamples(Vec<(NaiveDateTime, f64)>),
    /// Rows matched by a window definition.
    Flagged(FlaggedRows),
}

impl StageReport {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self {
            StageReport::None => String::new(),
            StageReport::DuplicatesDropped(n) => format!("{n} duplicate row(s) dropped"),
            StageReport::RowsRemoved(n) => format!("{n} row(s) removed"),
            StageReport::Octaves(p) => format!("{} octave band(s) produced", p.len()),
            StageReport::MissingSamples(bins) => {
                let total: f64 = bins.iter().map(|(_, n)| n).sum();
                format!("{} bin(s), {total} missing sample(s)", bins.len())
            }
            StageReport::Flagged(f) => format!("{} row(s) flagged '{}'", f.rows, f.window),
        }
    }
}
