//! Shared CLI helpers used across multiple commands.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use noisedp_config::SurveyConfig;

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
        _ => Err(format!(
            "Invalid column mapping: '{}' (expected NAME=HEADER)",
            s
        )),
    }
}

/// Load a survey configuration, or a default one when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SurveyConfig> {
    match path {
        Some(path) => SurveyConfig::load(path)
            .with_context(|| format!("loading survey configuration {}", path.display())),
        None => Ok(SurveyConfig::default()),
    }
}

/// Configured column mapping with command-line entries taking precedence.
pub fn column_mapping(
    config: &SurveyConfig,
    overrides: &[(String, String)],
) -> BTreeMap<String, String> {
    let mut columns = config.columns.clone();
    columns.extend(overrides.iter().cloned());
    columns
}
