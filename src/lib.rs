//! repo-analyzer: summarize a local repository into a single text artifact
//!
//! The artifact holds a bounded directory tree followed by the concatenated
//! contents of the selected files, capped by a global character budget. An
//! optional main file is written first and, for MATLAB sources, seeds a
//! lexical call-graph walk that narrows which other files are included.

pub mod cli;
pub mod concat;
pub mod config;
pub mod deps;
pub mod domain;
pub mod error;
pub mod render;
pub mod scan;
pub mod utils;

pub use concat::Aggregator;
pub use domain::{Config, PatternOrder, RunConfig, RunSummary, SkipReason, SkippedFile};
pub use error::AnalyzerError;
