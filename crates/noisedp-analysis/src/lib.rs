//! noisedp Analysis - summary tables for processed surveys
//!
//! This crate turns a flagged, resampled [`TimeSeries`](noisedp_core::TimeSeries)
//! into the tables a survey report is written from:
//!
//! - [`builder`] - [`TableBuilder`] producing daily and whole-survey tables per window
//! - [`spectrum`] - [`SpectrumMatcher`] picking a representative Lmax spectrum
//! - [`table`] - [`SummaryTable`] and [`SummaryRow`]
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, NaiveDate};
//! use noisedp_analysis::TableBuilder;
//! use noisedp_core::{Metadata, Resolution, TimeSeries, Value};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 5, 6)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap();
//! let index: Vec<_> = (0..48).map(|i| start + Duration::hours(i)).collect();
//! let series = TimeSeries::new(index)
//!     .with_column("LAeq_Main", vec![Value::Number(50.0); 48])
//!     .unwrap()
//!     .with_resolution(Resolution::hours(1));
//!
//! let meta = Metadata::new('A', vec![]).unwrap();
//! let tables = TableBuilder::new(&meta).build(&series).unwrap();
//!
//! // No flags: one whole-day window, two days
//! assert_eq!(tables.windows, ["24hr_Day"]);
//! assert_eq!(tables.main.len(), 2);
//! let leq = tables.main_mean.number(0, "LAeq_Main").unwrap();
//! assert!((leq - 50.0).abs() < 1e-9);
//! ```

pub mod builder;
pub mod spectrum;
pub mod table;

// Re-export main types at crate root
pub use builder::{DEFAULT_WINDOW, SurveyTables, TableBuilder};
pub use spectrum::{MatchMode, SpectrumMatcher};
pub use table::{
    MAX_LABEL, MEAN_LABEL, MODE_LABEL, SummaryRow, SummaryTable, USER_LABEL, weekday_name,
};
