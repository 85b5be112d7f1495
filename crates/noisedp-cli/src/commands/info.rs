//! Display CSV survey contents.

#![allow(clippy::print_literal)]

use std::path::PathBuf;

use clap::Args;
use noisedp_core::{ColumnDescriptor, Resolution};
use noisedp_io::read_csv;

use super::common::{column_mapping, load_config, parse_key_val};

/// Summarise a CSV survey file.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the CSV file
    pub file: PathBuf,

    /// Survey configuration supplying weighting, percentiles and column mapping
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Extra column mapping (e.g. "Time=Date/Time")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    pub column: Vec<(String, String)>,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let metadata = config.metadata()?;
    let series = read_csv(&args.file, &column_mapping(&config, &args.column))?;

    println!("File:       {}", args.file.display());
    println!("Samples:    {}", series.len());
    if let (Some(first), Some(last)) = (series.index().first(), series.index().last()) {
        println!("First:      {}", first.format("%Y-%m-%d %H:%M:%S"));
        println!("Last:       {}", last.format("%Y-%m-%d %H:%M:%S"));
    }
    match Resolution::infer(series.index()) {
        Some(resolution) => println!("Resolution: {resolution}"),
        None => println!("Resolution: unknown"),
    }

    println!();
    println!("  {:24}  {:10}  {}", "Column", "Kind", "Present");
    println!("  {:24}  {:10}  {}", "------", "----", "-------");
    for column in series.columns() {
        let desc = ColumnDescriptor::classify(
            &column.name,
            metadata.frequency_weighting(),
            metadata.percentiles(),
        );
        let present = column.values.iter().filter(|v| !v.is_null()).count();
        println!(
            "  {:24}  {:10}  {}/{}",
            column.name,
            desc.kind.to_string(),
            present,
            series.len()
        );
    }

    Ok(())
}
