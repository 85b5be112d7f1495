//! Stage listing command.

use clap::Args;
use noisedp_registry::{StageCategory, StageRegistry};

#[derive(Args)]
pub struct StagesArgs {
    /// Show details for a specific stage, by name or id
    #[arg(value_name = "STAGE")]
    stage: Option<String>,
}

pub fn run(args: StagesArgs) -> anyhow::Result<()> {
    let registry = StageRegistry::new();

    if let Some(name) = &args.stage {
        let stage = registry
            .get(name)
            .or_else(|| registry.get_by_id(name))
            .ok_or_else(|| anyhow::anyhow!("Unknown stage: {}", name))?;

        println!("{}", stage.name);
        println!("{}", "=".repeat(stage.name.len()));
        println!();
        println!("{}", stage.description);
        println!();
        println!("Category:  {}", stage.category.name());
        println!("Arguments: {}", format_args_list(stage.args));
        if stage.takes_metadata {
            println!("           (weighting, percentiles and Leq mode are appended)");
        }
        return Ok(());
    }

    println!("Available Stages");
    println!("================");
    for category in [
        StageCategory::Cleaning,
        StageCategory::Spectral,
        StageCategory::Periods,
        StageCategory::Aggregation,
    ] {
        let stages = registry.stages_in_category(category);
        if stages.is_empty() {
            continue;
        }
        println!();
        println!("{}:", category.name());
        for stage in stages {
            println!("  {:20}  {}", stage.name, stage.description);
            println!("  {:20}  args: {}", "", format_args_list(stage.args));
        }
    }

    Ok(())
}

fn format_args_list(args: &[&str]) -> String {
    if args.is_empty() {
        "none".to_string()
    } else {
        args.join(", ")
    }
}
