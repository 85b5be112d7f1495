//! noisedp Core - time-series model for acoustic survey processing
//!
//! This crate provides the foundational types shared by every processing
//! stage of a noise survey run.
//!
//! # Core Abstractions
//!
//! ## Data Model
//!
//! - [`TimeSeries`] - Timestamp index plus named columns of [`Value`]s
//! - [`Column`] - A single named column
//! - [`Resolution`] - Sampling interval with grid rounding and binning
//! - [`Metadata`] - Frequency weighting and percentile definitions of a survey
//!
//! ## Metric Classification
//!
//! Column names follow `L{weighting}{kind}[percentile][_band_Hz]`. They are
//! parsed once into a [`ColumnDescriptor`] and stages dispatch on its
//! [`MetricKind`]:
//!
//! - [`MetricSchema`] - Classified view over all columns of a series
//! - [`MetricKind`] - Leq, Lmax, Lmin, L##, LE, End_Time, Duration, Flag, other
//!
//! ## Stage System
//!
//! - [`Stage`] - Object-safe trait for all pipeline stages
//! - [`StageOutput`] / [`StageReport`] - New series plus auxiliary diagnostics
//!
//! ## Utilities
//!
//! - Level math: [`db_to_power`], [`power_to_db`], [`log_mean`], [`log_sum`]
//! - Statistics: [`mean`], [`median`], [`quantile`], [`lowest_mode`], [`trimmed_max`]
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use noisedp_core::{Resolution, TimeSeries, Value};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 3, 1)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap();
//! let res = Resolution::minutes(1);
//! let index: Vec<_> = (0..4).map(|i| start + res.as_duration() * i).collect();
//!
//! let series = TimeSeries::new(index)
//!     .with_column("LAeq_Main", [50.0, 52.0, 54.0, 56.0].map(Value::Number).to_vec())
//!     .unwrap()
//!     .with_resolution(res);
//!
//! assert_eq!(series.len(), 4);
//! ```

pub mod error;
pub mod level;
pub mod metadata;
pub mod metric;
pub mod series;
pub mod stage;
pub mod stats;
pub mod time;
pub mod value;

// Re-export main types at crate root
pub use error::{Error, Result};
pub use level::{db_to_power, log_mean, log_sum, power_to_db, round_half_even};
pub use metadata::Metadata;
pub use metric::{
    ADDRESS, ColumnDescriptor, DURATION, END_TIME, FLAG_PREFIX, MISSING_SAMPLES, MetricKind,
    MetricSchema, band_frequency, flag_column_name, is_bookkeeping, main_column_name, window_name,
};
pub use series::{Column, TimeSeries};
pub use stage::{FlaggedRows, OctaveProvenance, Stage, StageOutput, StageReport};
pub use stats::{lowest_mode, mean, median, quantile, trimmed_max};
pub use time::{Resolution, format_time_of_day, parse_timestamp};
pub use value::Value;
