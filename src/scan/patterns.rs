//! Ordered glob pattern sets.
//!
//! Scoping rules: a pattern without `/` matches a file name at any depth
//! (`*.py` behaves like `**/*.py`); a pattern containing `/` is matched against
//! the root-relative path, and a leading `/` or `./` anchors it to the root.
//! `*` never crosses a path separator; use `**` to span directories.

use crate::error::AnalyzerError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl PatternSet {
    /// Compile `patterns`, keeping their declaration order as match indices.
    pub fn new(patterns: &[String]) -> Result<Self, AnalyzerError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(&scoped(pattern))
                .literal_separator(true)
                .build()
                .map_err(|source| AnalyzerError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| AnalyzerError::InvalidPattern {
            pattern: patterns.join(", "),
            source,
        })?;
        Ok(Self { patterns: patterns.to_vec(), set })
    }

    pub fn empty() -> Self {
        Self { patterns: Vec::new(), set: GlobSet::empty() }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// `relative_path` uses `/` separators.
    pub fn is_match(&self, relative_path: &str) -> bool {
        self.set.is_match(relative_path)
    }

    /// Index of the earliest-declared pattern matching `relative_path`.
    pub fn first_match(&self, relative_path: &str) -> Option<usize> {
        self.set.matches(relative_path).into_iter().min()
    }

    /// The earliest-declared matching pattern itself, for diagnostics.
    pub fn first_matching_pattern(&self, relative_path: &str) -> Option<&str> {
        self.first_match(relative_path).map(|idx| self.patterns[idx].as_str())
    }
}

fn scoped(pattern: &str) -> String {
    let trimmed = pattern.trim();
    if let Some(anchored) = trimmed.strip_prefix("./").or_else(|| trimmed.strip_prefix('/')) {
        return anchored.to_string();
    }
    if trimmed.contains('/') {
        trimmed.to_string()
    } else {
        format!("**/{}", trimmed)
    }
}
