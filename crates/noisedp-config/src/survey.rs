//! Survey configuration file format and operations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use noisedp_core::Metadata;

use crate::error::ConfigError;
use crate::stage_config::StageConfig;

/// Configuration of one survey run.
///
/// Surveys are stored as TOML files holding the survey-level settings and
/// the ordered list of processing stages.
///
/// # TOML Format
///
/// ```toml
/// name = "Site A"
/// frequency_weighting = "A"
/// percentiles = [10, 90]
/// lmax_summary_remove = 10
///
/// [lmax_summary_override]
/// Daytime = 67.0
///
/// [columns]
/// Time = "Date/Time"
///
/// [[stages]]
/// stage = "Regularise"
/// args = ["5", "true"]
///
/// [[stages]]
/// stage = "Re-sample"
/// args = ["15", "1", "mean"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurveyConfig {
    /// Name of the survey.
    pub name: String,

    /// Frequency weighting letter.
    #[serde(default = "default_weighting")]
    pub frequency_weighting: String,

    /// Percentile numbers reported by the logger, in order.
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<u32>,

    /// Highest daily Lmax samples ignored in the summary tables.
    #[serde(default)]
    pub lmax_summary_remove: usize,

    /// User-defined Lmax per window for the representative spectrum table.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lmax_summary_override: BTreeMap<String, f64>,

    /// CSV header mapping, output name to input header.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, String>,

    /// Processing stages, applied in order.
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

fn default_weighting() -> String {
    "A".to_string()
}

fn default_percentiles() -> Vec<u32> {
    vec![10, 90]
}

impl SurveyConfig {
    /// Create a configuration with default settings and no stages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frequency_weighting: default_weighting(),
            percentiles: default_percentiles(),
            lmax_summary_remove: 0,
            lmax_summary_override: BTreeMap::new(),
            columns: BTreeMap::new(),
            stages: Vec::new(),
        }
    }

    /// Set the frequency weighting.
    pub fn with_weighting(mut self, weighting: impl Into<String>) -> Self {
        self.frequency_weighting = weighting.into();
        self
    }

    /// Set the percentile list.
    pub fn with_percentiles(mut self, percentiles: Vec<u32>) -> Self {
        self.percentiles = percentiles;
        self
    }

    /// Set the number of highest daily Lmax samples to ignore.
    pub fn with_lmax_remove(mut self, n: usize) -> Self {
        self.lmax_summary_remove = n;
        self
    }

    /// Add a user-defined Lmax for a window.
    pub fn with_lmax_override(mut self, window: impl Into<String>, lmax: f64) -> Self {
        self.lmax_summary_override.insert(window.into(), lmax);
        self
    }

    /// Map an output column name to an input CSV header.
    pub fn with_column(mut self, name: impl Into<String>, header: impl Into<String>) -> Self {
        self.columns.insert(name.into(), header.into());
        self
    }

    /// Add a stage to the pipeline.
    pub fn with_stage(mut self, stage: StageConfig) -> Self {
        self.stages.push(stage);
        self
    }

    /// Add multiple stages to the pipeline.
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = StageConfig>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Survey metadata from the weighting and percentile settings.
    pub fn metadata(&self) -> Result<Metadata, ConfigError> {
        Metadata::from_weighting_str(&self.frequency_weighting, self.percentiles.clone())
            .map_err(ConfigError::Survey)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Names of the windows flagged by this pipeline, in stage order.
    pub fn window_names(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.stage == "Flag time")
            .filter_map(|s| s.args.first().map(String::as_str))
            .collect()
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
name = "Site A"
frequency_weighting = "A"
percentiles = [5, 90]
lmax_summary_remove = 10

[lmax_summary_override]
Daytime = 67.0

[columns]
Time = "Date/Time"

[[stages]]
stage = "Regularise"
args = ["5", "true"]

[[stages]]
stage = "Flag time"
args = ["Daytime", "2024-01-01 07:00", "2024-01-01 23:00", "0,1,2,3,4"]

[[stages]]
stage = "Convert to octaves"
"#;

    #[test]
    fn test_parse_example() {
        let config = SurveyConfig::from_toml(EXAMPLE).unwrap();
        assert_eq!(config.name, "Site A");
        assert_eq!(config.percentiles, [5, 90]);
        assert_eq!(config.lmax_summary_remove, 10);
        assert_eq!(config.lmax_summary_override.get("Daytime"), Some(&67.0));
        assert_eq!(config.columns.get("Time").map(String::as_str), Some("Date/Time"));
        assert_eq!(config.stages.len(), 3);
        assert!(config.stages[2].args.is_empty());
        assert_eq!(config.window_names(), ["Daytime"]);
    }

    #[test]
    fn test_defaults() {
        let config = SurveyConfig::from_toml(r#"name = "Bare""#).unwrap();
        assert_eq!(config.frequency_weighting, "A");
        assert_eq!(config.percentiles, [10, 90]);
        assert_eq!(config.lmax_summary_remove, 0);
        assert!(config.stages.is_empty());
    }

    #[test]
    fn test_metadata() {
        let meta = SurveyConfig::new("x").with_weighting("C").metadata().unwrap();
        assert_eq!(meta.frequency_weighting(), 'C');
        assert_eq!(meta.percentiles(), [10, 90]);

        let err = SurveyConfig::new("x").with_weighting("AB").metadata().unwrap_err();
        assert!(matches!(err, ConfigError::Survey(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SurveyConfig::new("Roundtrip")
            .with_percentiles(vec![10, 50, 90])
            .with_lmax_override("Night", 58.0)
            .with_stage(StageConfig::new("Re-sample").with_args(["15", "0", "mean"]));
        let parsed = SurveyConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_malformed_toml() {
        let err = SurveyConfig::from_toml("name = ").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
