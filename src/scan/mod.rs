//! Directory walking: the bounded tree listing and file selection

use crate::domain::RunConfig;
use crate::error::AnalyzerError;

pub mod patterns;
pub mod selector;
pub mod tree;

pub use patterns::PatternSet;
pub use selector::{Candidate, FileSelector, SelectionStats};
pub use tree::{render_tree, TreeLines, TreeOptions};

/// Select the files a run would concatenate, before main-file handling.
pub fn select_files(config: &RunConfig) -> Result<(Vec<Candidate>, SelectionStats), AnalyzerError> {
    let mut selector = FileSelector::from_config(config)?;
    let files = selector.select();
    let stats = selector.stats().clone();
    Ok((files, stats))
}
