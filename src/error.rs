//! Error taxonomy for the analysis engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the scanning, selection and aggregation components.
///
/// Only [`AnalyzerError::RootAccess`] and [`AnalyzerError::NotADirectory`] are
/// fatal to a run; traversal and read failures are reported per directory or
/// per file and the caller decides whether to skip them.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The root directory is missing or cannot be listed.
    #[error("cannot access root directory {path}: {source}")]
    RootAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("root path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A directory below the root could not be listed.
    #[error("failed to list directory {path}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A candidate file vanished or could not be opened/read.
    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to read pattern file {path}: {source}")]
    PatternFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output artifact: {0}")]
    Output(#[source] std::io::Error),
}

impl AnalyzerError {
    /// Whether the run must abort when this error surfaces.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Traversal { .. } | Self::Read { .. })
    }
}
