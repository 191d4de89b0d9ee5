//! Info command implementation

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::selection::SelectionArgs;
use super::utils::format_with_commas;
use crate::concat::Aggregator;
use crate::utils::display_path;

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Show what `analyze` would write, without reading file contents.
pub fn run(args: InfoArgs) -> Result<()> {
    let config = args.selection.resolve(args.selection.overrides())?;
    let aggregator = Aggregator::new(&config);
    let plan = aggregator.plan()?;

    let main_file = plan.main_file.as_deref().map(|p| display_path(p, &config.root));
    let files: Vec<&str> = plan.files.iter().map(|c| c.relative_path.as_str()).collect();

    if args.json {
        let report = json!({
            "project": config.project_name(),
            "root": config.root.display().to_string(),
            "output": config.output_path.display().to_string(),
            "main_file": main_file,
            "dialect": plan.dialect,
            "max_chars": config.max_chars,
            "include_patterns": config.include_patterns,
            "ignore_patterns": config.ignore_patterns,
            "files": files,
            "selection": {
                "files_seen": plan.selection.files_seen,
                "files_selected": plan.selection.files_selected,
                "skipped_extension": plan.selection.skipped_extension,
                "skipped_ignored": plan.selection.skipped_ignored,
                "skipped_unmatched": plan.selection.skipped_unmatched,
                "walk_errors": plan.selection.walk_errors,
            },
            "tree": plan.tree,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Repository: {}", config.project_name());
    println!("Output: {}", config.output_path.display());
    if let Some(main) = &main_file {
        println!("Main file: {}", main);
    }
    println!("Dependency dialect: {}", plan.dialect.unwrap_or("none"));
    match config.max_chars {
        Some(max) => println!("Character limit: {}", format_with_commas(max)),
        None => println!("Character limit: none"),
    }
    println!(
        "Files seen: {}  (extension: {}, ignored: {}, unmatched: {})",
        format_with_commas(plan.selection.files_seen),
        plan.selection.skipped_extension,
        plan.selection.skipped_ignored,
        plan.selection.skipped_unmatched
    );

    println!();
    println!("Directory Structure:");
    for line in &plan.tree {
        println!("{}", line);
    }

    println!();
    if files.is_empty() && main_file.is_none() {
        println!("No files found matching the criteria");
    } else {
        println!("Files in output order ({}):", files.len() + usize::from(main_file.is_some()));
        if let Some(main) = &main_file {
            println!("  {} (Main File)", main);
        }
        for file in &files {
            println!("  {}", file);
        }
    }
    Ok(())
}
