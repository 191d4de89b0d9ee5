//! Arguments shared by every command that walks a repository.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use super::utils::parse_csv;
use crate::config::{load_config, merge_cli_with_config, resolve_run_config, CliOverrides};
use crate::domain::{PatternOrder, RunConfig};

#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Repository directory to analyze (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Path to config file (repo-analyzer.toml or .repo-analyzer.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Main file written first; a MATLAB main file also narrows the output to its call graph
    #[arg(short = 'm', long, value_name = "FILE")]
    pub main_file: Option<PathBuf>,

    /// Stop after this many characters of file content
    #[arg(long, value_name = "N")]
    pub max_chars: Option<usize>,

    /// Maximum depth of the directory tree listing
    #[arg(long, value_name = "N")]
    pub tree_depth: Option<usize>,

    /// Maximum entries listed per directory in the tree
    #[arg(long, value_name = "N")]
    pub max_items: Option<usize>,

    /// Include hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Include only files matching these globs (repeatable or comma-separated)
    #[arg(short = 'i', long = "include", value_name = "GLOBS", value_delimiter = ',')]
    pub include: Vec<String>,

    /// Read include globs from a file, one per line
    #[arg(long, value_name = "FILE")]
    pub include_file: Option<PathBuf>,

    /// Exclude files matching these globs (repeatable or comma-separated)
    #[arg(short = 'e', long = "ignore", value_name = "GLOBS", value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Read ignore globs from a file, one per line
    #[arg(long, value_name = "FILE")]
    pub ignore_file: Option<PathBuf>,

    /// Replace the eligible extensions (comma-separated, e.g. '.py,.m')
    #[arg(long, value_name = "EXTS")]
    pub ext: Option<String>,

    /// Honour .gitignore files while selecting
    #[arg(long)]
    pub gitignore: bool,

    /// Keep include-pattern groups in declaration order instead of reversing them
    #[arg(long)]
    pub declared_order: bool,

    /// Give up on a single file after this many seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    pub read_timeout: Option<u64>,
}

impl SelectionArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            path: self.path.clone(),
            main_file: self.main_file.clone(),
            max_chars: self.max_chars,
            tree_depth: self.tree_depth,
            max_items: self.max_items,
            include_hidden: self.include_hidden.then_some(true),
            include_patterns: trimmed(&self.include),
            include_file: self.include_file.clone(),
            ignore_patterns: trimmed(&self.ignore),
            ignore_file: self.ignore_file.clone(),
            valid_extensions: parse_csv(&self.ext),
            read_timeout_secs: self.read_timeout,
            pattern_order: self.declared_order.then_some(PatternOrder::Declared),
            respect_gitignore: self.gitignore.then_some(true),
            ..CliOverrides::default()
        }
    }

    /// Load config for the target directory, apply `overrides` and validate.
    pub fn resolve(&self, overrides: CliOverrides) -> Result<RunConfig> {
        let cwd = std::env::current_dir().context("Cannot determine working directory")?;
        let anchor = self.path.as_deref().map(|p| absolutize(p, &cwd)).unwrap_or_else(|| cwd.clone());

        let file_config = load_config(&anchor, self.config.as_deref())?;
        let merged = merge_cli_with_config(file_config, overrides);
        tracing::debug!("Merged configuration: {:?}", merged);

        Ok(resolve_run_config(merged, &cwd)?)
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
