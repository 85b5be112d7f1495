//! Error types for series construction and stage execution.

use thiserror::Error;

/// Errors raised by the core data model and by processing stages.
///
/// Variants carry enough context (stage, metric, offending value) for the
/// caller to report the failure to a human without further lookups.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A column's length does not match the series index.
    #[error("column '{column}' has {actual} values but the index has {expected}")]
    LengthMismatch {
        /// Name of the offending column.
        column: String,
        /// Number of index entries.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A resolution string could not be parsed or is not positive.
    #[error("invalid resolution '{0}'")]
    InvalidResolution(String),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// A frequency weighting is not a single ASCII letter.
    #[error("invalid frequency weighting '{0}'")]
    InvalidWeighting(String),

    /// Unknown percentile averaging type.
    #[error("invalid percentile averaging type '{0}': expected mean, median, mode or lq")]
    InvalidAverageType(String),

    /// Unknown Leq averaging mode.
    #[error("invalid Leq averaging mode '{0}': expected linear or log")]
    InvalidLeqMode(String),

    /// A window recurrence could not be parsed.
    #[error("invalid recurrence '{0}': expected false or weekday indices 0-6")]
    InvalidRecurrence(String),

    /// A stage received the wrong number of arguments.
    #[error("{stage}: expected {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Stage name.
        stage: String,
        /// Human-readable description of the expected count.
        expected: String,
        /// Number of arguments received.
        actual: usize,
    },

    /// A stage argument has an invalid value.
    #[error("{stage}: invalid argument '{value}': {reason}")]
    InvalidArgument {
        /// Stage name.
        stage: String,
        /// The offending argument.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A column the stage requires is absent.
    #[error("{stage}: missing column '{column}'")]
    MissingColumn {
        /// Stage name.
        stage: String,
        /// Name of the expected column.
        column: String,
    },

    /// A metric's columns do not have the shape the stage expects.
    #[error("{stage}: metric '{metric}' {reason}")]
    Shape {
        /// Stage name.
        stage: String,
        /// Metric whose columns are malformed.
        metric: String,
        /// Description of the mismatch.
        reason: String,
    },
}

impl Error {
    /// Create an invalid argument error.
    pub fn invalid_argument(
        stage: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidArgument {
            stage: stage.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing column error.
    pub fn missing_column(stage: impl Into<String>, column: impl Into<String>) -> Self {
        Error::MissingColumn {
            stage: stage.into(),
            column: column.into(),
        }
    }

    /// Create a shape mismatch error.
    pub fn shape(
        stage: impl Into<String>,
        metric: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Shape {
            stage: stage.into(),
            metric: metric.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
