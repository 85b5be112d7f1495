//! Survey configuration and pipeline runner for noisedp.
//!
//! This crate loads a survey's TOML configuration and turns its stage list
//! into a runnable [`Pipeline`].
//!
//! # Features
//!
//! - **Survey Files**: Load and save [`SurveyConfig`] as TOML
//! - **Pipelines**: Build stages by name through a [`StageRegistry`]
//! - **Reports**: Collect every stage's [`StageReport`](noisedp_core::StageReport) in run order
//!
//! # Example
//!
//! ```rust,no_run
//! use noisedp_config::{Pipeline, SurveyConfig};
//! use noisedp_core::TimeSeries;
//! use noisedp_registry::StageRegistry;
//!
//! let config = SurveyConfig::load("survey.toml").unwrap();
//! let metadata = config.metadata().unwrap();
//! let pipeline = Pipeline::from_config(&config, &StageRegistry::new(), &metadata).unwrap();
//!
//! let run = pipeline.run(TimeSeries::default()).unwrap();
//! for (stage, report) in &run.reports {
//!     println!("{stage}: {}", report.summary());
//! }
//! ```

mod error;
mod pipeline;
mod stage_config;
mod survey;

pub use error::ConfigError;
pub use pipeline::{Pipeline, PipelineRun};
pub use stage_config::StageConfig;
pub use survey::SurveyConfig;

/// Re-export commonly used types from noisedp-registry
pub use noisedp_registry::{StageCategory, StageDescriptor, StageRegistry};
