//! Merge CLI overrides into the loaded config.

use crate::domain::{Config, PatternOrder};
use std::path::PathBuf;

/// Values supplied on the command line. `None`/empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub path: Option<PathBuf>,
    pub main_file: Option<PathBuf>,
    pub max_chars: Option<usize>,
    pub tree_depth: Option<usize>,
    pub max_items: Option<usize>,
    pub include_hidden: Option<bool>,
    pub include_patterns: Vec<String>,
    pub include_file: Option<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub ignore_file: Option<PathBuf>,
    pub valid_extensions: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub read_timeout_secs: Option<u64>,
    pub pattern_order: Option<PatternOrder>,
    pub respect_gitignore: Option<bool>,
    pub include_timestamp: Option<bool>,
}

/// CLI values win over the config; pattern lists are appended, keeping
/// declaration order and dropping repeats.
pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    if cli.path.is_some() {
        config.path = cli.path;
    }
    if cli.main_file.is_some() {
        config.main_file = cli.main_file;
    }
    if cli.max_chars.is_some() {
        config.max_chars = cli.max_chars;
    }
    if let Some(depth) = cli.tree_depth {
        config.tree_depth = depth;
    }
    if let Some(items) = cli.max_items {
        config.max_items = items;
    }
    if let Some(hidden) = cli.include_hidden {
        config.include_hidden = hidden;
    }
    append_unique(&mut config.include_patterns, cli.include_patterns);
    if cli.include_file.is_some() {
        config.include_file = cli.include_file;
    }
    append_unique(&mut config.ignore_patterns, cli.ignore_patterns);
    if cli.ignore_file.is_some() {
        config.ignore_file = cli.ignore_file;
    }
    if let Some(exts) = cli.valid_extensions {
        config.valid_extensions =
            exts.iter().map(|ext| crate::domain::normalize_extension(ext)).collect();
    }
    if cli.output.is_some() {
        config.output = cli.output;
    }
    if let Some(secs) = cli.read_timeout_secs {
        config.read_timeout_secs = secs;
    }
    if let Some(order) = cli.pattern_order {
        config.pattern_order = order;
    }
    if let Some(respect) = cli.respect_gitignore {
        config.respect_gitignore = respect;
    }
    if let Some(stamp) = cli.include_timestamp {
        config.include_timestamp = stamp;
    }
    config
}

pub(crate) fn append_unique(target: &mut Vec<String>, extra: Vec<String>) {
    for item in extra {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
