//! noisedp CLI - Command-line interface for the noisedp survey processor.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "noisedp")]
#[command(author, version, about = "Acoustic noise survey processor", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a survey configuration over a CSV dataset and export the tables
    Process(commands::process::ProcessArgs),

    /// List available processing stages and their arguments
    Stages(commands::stages::StagesArgs),

    /// Summarise a CSV dataset
    Info(commands::info::InfoArgs),

    /// Check a survey configuration without processing data
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Stages(args) => commands::stages::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Validate(args) => commands::validate::run(args),
    }
}
