//! Error types for configuration and pipeline operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a survey configuration or running
/// its pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Survey-level settings (weighting, percentiles) are invalid
    #[error("invalid survey settings: {0}")]
    Survey(#[source] noisedp_core::Error),

    /// Stage name not in the registry
    #[error("unknown stage: {0}")]
    UnknownStage(String),

    /// A stage rejected its arguments
    #[error("stage {index} ('{stage}'): {source}")]
    InvalidArgument {
        /// Position of the stage in the pipeline.
        index: usize,
        /// Stage name.
        stage: String,
        /// Error raised by the stage constructor.
        #[source]
        source: noisedp_core::Error,
    },

    /// A stage failed while running
    #[error("stage {index} ('{stage}') failed: {source}")]
    StageFailed {
        /// Position of the stage in the pipeline.
        index: usize,
        /// Stage name.
        stage: String,
        /// Error raised by the stage.
        #[source]
        source: noisedp_core::Error,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}
