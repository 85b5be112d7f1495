//! Survey configuration check.

use std::path::PathBuf;

use clap::Args;
use noisedp_config::{Pipeline, StageRegistry};

use super::common::load_config;

#[derive(Args)]
pub struct ValidateArgs {
    /// Survey configuration (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let config = load_config(Some(&args.config))?;
    let metadata = config.metadata()?;
    let pipeline = Pipeline::from_config(&config, &StageRegistry::new(), &metadata)?;

    println!("Survey:      {}", config.name);
    println!("Weighting:   {}", metadata.frequency_weighting());
    let percentiles: Vec<String> = metadata.percentiles().iter().map(u32::to_string).collect();
    println!("Percentiles: {}", percentiles.join(", "));
    println!("Stages:");
    for (i, name) in pipeline.stage_names().iter().enumerate() {
        let args = pipeline.args(i).unwrap_or_default();
        println!("  {}. {} [{}]", i + 1, name, args.join(", "));
    }
    let windows = config.window_names();
    if !windows.is_empty() {
        println!("Windows:     {}", windows.join(", "));
    }
    println!("OK");

    Ok(())
}
