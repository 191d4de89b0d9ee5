//! Analyze command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use super::selection::SelectionArgs;
use super::utils::format_with_commas;
use crate::concat::Aggregator;
use crate::utils::{display_path, estimate_tokens};

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output file (defaults to <PATH>/<name>_summary.txt)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Leave the generation timestamp out of the header
    #[arg(long)]
    pub no_timestamp: bool,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    let mut overrides = args.selection.overrides();
    overrides.output = args.output.clone();
    if args.no_timestamp {
        overrides.include_timestamp = Some(false);
    }
    let config = args.selection.resolve(overrides)?;

    println!("Generating directory tree for {}...", config.root.display());
    let aggregator = Aggregator::new(&config);
    let plan = aggregator.plan()?;
    if let Some(dialect) = plan.dialect {
        println!("Following {} dependencies from the main file ({} files)", dialect, plan.files.len());
    }

    println!("Concatenating files for {}...", config.root.display());
    if plan.is_empty() {
        println!("No files found matching the criteria");
    }
    let summary = aggregator
        .run_plan(&plan)
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;

    match config.max_chars {
        Some(max) if summary.budget_exhausted => {
            println!("Reached maximum character limit: {}", format_with_commas(max));
        }
        _ => println!(
            "Files concatenated successfully, total characters: {}",
            format_with_commas(summary.chars_written)
        ),
    }
    println!(
        "  Files: {} included, {} skipped (~{} tokens) in {:.2}s",
        summary.files_included,
        summary.files_skipped(),
        format_with_commas(estimate_tokens(summary.chars_written)),
        start_time.elapsed().as_secs_f64()
    );
    for skip in &summary.skipped {
        println!("  Skipped {}: {}", display_path(&skip.path, &config.root), skip.reason);
    }
    println!("Output saved to {}", config.output_path.display());
    Ok(())
}
