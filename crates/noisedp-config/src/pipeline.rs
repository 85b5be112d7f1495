//! Pipeline construction and execution.
//!
//! A [`Pipeline`] is built from a [`SurveyConfig`] and an explicit
//! [`StageRegistry`]. Stages taking survey metadata get the frequency
//! weighting, the comma-joined percentile list and the `log` Leq mode
//! appended to their configured arguments.
//!
//! # Example
//!
//! ```rust
//! use noisedp_config::{Pipeline, StageConfig, SurveyConfig};
//! use noisedp_registry::StageRegistry;
//!
//! let config = SurveyConfig::new("Site A")
//!     .with_stage(StageConfig::new("Regularise").with_arg("1"))
//!     .with_stage(StageConfig::new("Re-sample").with_args(["15", "0", "mean"]));
//!
//! let registry = StageRegistry::new();
//! let metadata = config.metadata().unwrap();
//! let pipeline = Pipeline::from_config(&config, &registry, &metadata).unwrap();
//!
//! assert_eq!(pipeline.stage_names(), ["Regularise", "Re-sample"]);
//! assert_eq!(pipeline.args(1).unwrap(), ["15", "0", "mean", "A", "10,90", "log"]);
//! ```

use noisedp_core::{Metadata, Stage, StageReport, TimeSeries};
use noisedp_registry::StageRegistry;
use tracing::info;

use crate::error::ConfigError;
use crate::stage_config::StageConfig;
use crate::survey::SurveyConfig;

/// Leq averaging mode passed to metadata-taking stages.
const LEQ_MODE: &str = "log";

struct PipelineEntry {
    stage: Box<dyn Stage>,
    args: Vec<String>,
}

/// An ordered list of constructed stages.
pub struct Pipeline {
    entries: Vec<PipelineEntry>,
}

/// Output of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// Final series.
    pub series: TimeSeries,
    /// Stage name and report of every stage, in run order.
    pub reports: Vec<(String, StageReport)>,
}

impl Pipeline {
    /// Build the pipeline of a survey configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStage`] for a stage name missing from
    /// the registry and [`ConfigError::InvalidArgument`] when a stage
    /// rejects its arguments.
    pub fn from_config(
        config: &SurveyConfig,
        registry: &StageRegistry,
        metadata: &Metadata,
    ) -> Result<Self, ConfigError> {
        Self::from_stages(&config.stages, registry, metadata)
    }

    /// Build a pipeline from stage entries.
    pub fn from_stages(
        stages: &[StageConfig],
        registry: &StageRegistry,
        metadata: &Metadata,
    ) -> Result<Self, ConfigError> {
        let entries = stages
            .iter()
            .enumerate()
            .map(|(index, config)| {
                let descriptor = registry
                    .get(&config.stage)
                    .ok_or_else(|| ConfigError::UnknownStage(config.stage.clone()))?;

                let mut args = config.args.clone();
                if descriptor.takes_metadata {
                    args.extend(metadata_args(metadata));
                }

                let stage = registry
                    .create(&config.stage, &args)
                    .ok_or_else(|| ConfigError::UnknownStage(config.stage.clone()))?
                    .map_err(|source| ConfigError::InvalidArgument {
                        index,
                        stage: config.stage.clone(),
                        source,
                    })?;
                Ok(PipelineEntry { stage, args })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { entries })
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stage names in run order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.stage.name()).collect()
    }

    /// Effective arguments of a stage, including appended metadata.
    pub fn args(&self, index: usize) -> Option<&[String]> {
        self.entries.get(index).map(|e| e.args.as_slice())
    }

    /// Run every stage in order.
    pub fn run(&self, series: TimeSeries) -> Result<PipelineRun, ConfigError> {
        self.run_with(series, |_, _| {})
    }

    /// Run every stage in order, calling `on_stage(index, name)` before each.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StageFailed`] for the first failing stage.
    pub fn run_with(
        &self,
        series: TimeSeries,
        mut on_stage: impl FnMut(usize, &str),
    ) -> Result<PipelineRun, ConfigError> {
        let mut current = series;
        let mut reports = Vec::with_capacity(self.entries.len());

        for (index, entry) in self.entries.iter().enumerate() {
            let name = entry.stage.name();
            on_stage(index, name);

            let output = entry
                .stage
                .apply(&current)
                .map_err(|source| ConfigError::StageFailed {
                    index,
                    stage: name.to_string(),
                    source,
                })?;

            info!(
                stage = name,
                rows = output.series.len(),
                columns = output.series.columns().len(),
                report = %output.report.summary(),
                "stage complete"
            );

            current = output.series;
            reports.push((name.to_string(), output.report));
        }

        Ok(PipelineRun {
            series: current,
            reports,
        })
    }
}

/// Weighting, comma-joined percentiles and Leq mode.
fn metadata_args(metadata: &Metadata) -> [String; 3] {
    let percentiles: Vec<String> = metadata.percentiles().iter().map(u32::to_string).collect();
    [
        metadata.frequency_weighting().to_string(),
        percentiles.join(","),
        LEQ_MODE.to_string(),
    ]
}
