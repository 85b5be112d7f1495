//! Pipeline stage configuration.

use serde::{Deserialize, Serialize};

/// One entry of a survey's pipeline.
///
/// Arguments are kept as strings; each stage parses its own.
///
/// # Example
///
/// ```rust
/// use noisedp_config::StageConfig;
///
/// let config = StageConfig::new("Flag time")
///     .with_args(["Night", "2024-01-01 23:00", "2024-01-02 07:00", "0,1,2,3,4,5,6"]);
///
/// assert_eq!(config.stage, "Flag time");
/// assert_eq!(config.args.len(), 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageConfig {
    /// Stage name as registered (e.g. "Regularise", "Re-sample").
    pub stage: String,

    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

impl StageConfig {
    /// Create a stage entry with no arguments.
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn with_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_default_to_empty() {
        let config: StageConfig = toml::from_str(r#"stage = "Convert to octaves""#).unwrap();
        assert_eq!(config, StageConfig::new("Convert to octaves"));
    }

    #[test]
    fn builder_appends_in_order() {
        let config = StageConfig::new("Re-sample").with_arg("15").with_args(["1", "mean"]);
        assert_eq!(config.args, ["15", "1", "mean"]);
    }
}
