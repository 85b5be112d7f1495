//! Survey file I/O for noisedp.
//!
//! This crate provides:
//!
//! - **CSV reading**: [`read_csv`] loads a logger export into a [`TimeSeries`](noisedp_core::TimeSeries)
//! - **Export**: [`export`] writes the processed data, a survey summary,
//!   every summary table and a JSON copy of the run configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use noisedp_analysis::TableBuilder;
//! use noisedp_config::SurveyConfig;
//! use noisedp_io::{export, read_csv};
//!
//! let config = SurveyConfig::load("survey.toml")?;
//! let metadata = config.metadata()?;
//! let series = read_csv("logger.csv", &config.columns)?;
//! let tables = TableBuilder::new(&metadata).build(&series)?;
//!
//! let written = export("out/site_a", &series, &metadata, &tables, &config)?;
//! println!("wrote {} files", written.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod export;
mod reader;

pub use export::{
    FULL_DATA_FILE, SUMMARY_FILE, export, full_data_columns, summary_entries, write_full_data,
    write_table,
};
pub use reader::{ADDRESS, TIME, read_csv, read_csv_from};

/// Error types for survey I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// CSV parse or write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The time index column is absent.
    #[error("missing time column '{0}'")]
    MissingTimeColumn(String),

    /// A row's timestamp could not be parsed.
    #[error("row {row}: {source}")]
    Timestamp {
        /// 1-based data row number.
        row: usize,
        /// Parse failure.
        #[source]
        source: noisedp_core::Error,
    },

    /// The parsed data does not form a valid series.
    #[error("invalid data: {0}")]
    Data(#[from] noisedp_core::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for survey I/O.
pub type Result<T> = std::result::Result<T, Error>;
