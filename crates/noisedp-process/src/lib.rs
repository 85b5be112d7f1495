//! noisedp Process - survey pre-processing stages
//!
//! This crate provides the [`Stage`](noisedp_core::Stage) implementations a
//! pipeline is assembled from:
//!
//! - [`Regularise`] - Snap timestamps to a grid, drop collisions, pad gaps
//! - [`OctaveReducer`] - Fold third-octave bands into octaves
//! - [`FlagPeriod`] - Mark rows inside a (possibly recurring) [`TimeWindow`]
//! - [`RemovePeriods`] - Null rows outside the kept windows
//! - [`Resample`] - Metric-aware aggregation to a coarser resolution
//!
//! Every stage has a `from_args` constructor taking the string arguments of
//! a pipeline configuration entry; the [`args`] module holds the shared
//! parsers.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use noisedp_core::{Resolution, Stage, TimeSeries, Value};
//! use noisedp_process::{Regularise, Resample, ResampleParams};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 3, 1)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 20)
//!     .unwrap();
//! let index: Vec<_> = (0..4).map(|i| start + chrono::Duration::minutes(i)).collect();
//! let raw = TimeSeries::new(index)
//!     .with_column("LAmax_Main", [60.0, 65.0, 70.0, 55.0].map(Value::Number).to_vec())
//!     .unwrap();
//!
//! let regular = Regularise::new(Resolution::minutes(1), false).apply(&raw).unwrap();
//! let params = ResampleParams::new(Resolution::minutes(4), 'A', vec![]).with_max_remove(1);
//! let out = Resample::new(params).apply(&regular.series).unwrap();
//!
//! assert_eq!(out.series.value(0, "LAmax_Main"), Some(&Value::Number(65.0)));
//! ```

pub mod args;
pub mod flag;
pub mod octave;
pub mod regularise;
pub mod remove;
pub mod resample;

// Re-export main types at crate root
pub use flag::{FlagPeriod, TimeWindow};
pub use octave::OctaveReducer;
pub use regularise::Regularise;
pub use remove::RemovePeriods;
pub use resample::{AverageType, Bins, LeqMode, Resample, ResampleParams};
