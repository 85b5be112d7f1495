//! Survey processing command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use noisedp_analysis::TableBuilder;
use noisedp_config::{Pipeline, StageRegistry};
use noisedp_io::{export, read_csv};
use tracing::debug;

use super::common::{column_mapping, load_config, parse_key_val};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input CSV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Survey configuration (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Extra column mapping (e.g. "Time=Date/Time")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    column: Vec<(String, String)>,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let config = load_config(Some(&args.config))?;
    let metadata = config.metadata()?;
    println!("Survey: {}", config.name);

    println!("Reading {}...", args.input.display());
    let columns = column_mapping(&config, &args.column);
    let series = read_csv(&args.input, &columns)
        .with_context(|| format!("reading {}", args.input.display()))?;
    println!(
        "  {} samples, {} columns",
        series.len(),
        series.columns().len()
    );

    let registry = StageRegistry::new();
    let pipeline = Pipeline::from_config(&config, &registry, &metadata)?;
    println!("Running {} stage(s)...", pipeline.len());

    let pb = ProgressBar::new(pipeline.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    let run = pipeline.run_with(series, |index, name| {
        pb.set_position(index as u64);
        pb.set_message(name.to_string());
    })?;
    pb.finish_with_message("done");

    println!("\nStages:");
    for (name, report) in &run.reports {
        println!("  {:14}  {}", name, report.summary());
    }

    let tables = TableBuilder::new(&metadata)
        .with_max_remove(config.lmax_summary_remove)
        .with_overrides(config.lmax_summary_override.clone())
        .build(&run.series)?;
    println!("\nWindows: {}", tables.windows.join(", "));
    for (name, table) in tables.named() {
        debug!(table = name, rows = table.len(), "built table");
    }

    println!("\nWriting {}...", args.output.display());
    let written = export(&args.output, &run.series, &metadata, &tables, &config)?;
    println!("Done! {} files written.", written.len());

    Ok(())
}
