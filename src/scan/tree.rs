//! Directory tree rendering.
//!
//! Produces the bounded listing written at the top of the artifact: one line
//! per entry, depth-first pre-order, names sorted byte-wise, at most
//! `max_items` entries per directory followed by a `...` sentinel when more
//! exist.

use crate::domain::RunConfig;
use crate::error::AnalyzerError;
use crate::utils::is_hidden_name;
use std::fs;
use std::path::{Path, PathBuf};

const BRANCH: &str = "|-- ";
const INDENT: &str = "  ";

/// Marker shown in place of entries cut by the per-directory cap.
pub const MORE_ITEMS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Directories are descended while their depth is below `max_depth - 1`.
    pub max_depth: usize,
    pub max_items: usize,
    pub include_hidden: bool,
}

impl From<&RunConfig> for TreeOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            max_depth: config.tree_depth,
            max_items: config.max_items,
            include_hidden: config.include_hidden,
        }
    }
}

enum Slot {
    Entry { name: String, path: PathBuf, is_dir: bool },
    More,
}

struct Level {
    slots: std::vec::IntoIter<Slot>,
    depth: usize,
}

/// Lazy pre-order walk yielding one rendered line per entry.
///
/// A subdirectory that cannot be listed yields an `Err` item right after its
/// own line; iteration then continues with its siblings, so the caller picks
/// between skipping and aborting.
pub struct TreeLines {
    stack: Vec<Level>,
    options: TreeOptions,
    pending_error: Option<AnalyzerError>,
}

impl TreeLines {
    /// Fails only when `root` itself cannot be listed.
    pub fn new(root: &Path, options: TreeOptions) -> Result<Self, AnalyzerError> {
        let slots = list_level(root, &options)?;
        Ok(Self {
            stack: vec![Level { slots: slots.into_iter(), depth: 0 }],
            options,
            pending_error: None,
        })
    }
}

impl Iterator for TreeLines {
    type Item = Result<String, AnalyzerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_error.take() {
            return Some(Err(err));
        }

        loop {
            let level = self.stack.last_mut()?;
            let depth = level.depth;
            match level.slots.next() {
                None => {
                    self.stack.pop();
                }
                Some(Slot::More) => return Some(Ok(render_line(depth, MORE_ITEMS, false))),
                Some(Slot::Entry { name, path, is_dir }) => {
                    if is_dir && depth + 1 < self.options.max_depth {
                        match list_level(&path, &self.options) {
                            Ok(slots) => self
                                .stack
                                .push(Level { slots: slots.into_iter(), depth: depth + 1 }),
                            Err(err) => self.pending_error = Some(err),
                        }
                    }
                    return Some(Ok(render_line(depth, &name, is_dir)));
                }
            }
        }
    }
}

/// Render the whole tree, skipping (and logging) unreadable subdirectories.
pub fn render_tree(root: &Path, options: TreeOptions) -> Result<Vec<String>, AnalyzerError> {
    let mut lines = Vec::new();
    for item in TreeLines::new(root, options)? {
        match item {
            Ok(line) => lines.push(line),
            Err(err) => tracing::warn!("Skipping subtree: {}", err),
        }
    }
    Ok(lines)
}

fn list_level(dir: &Path, options: &TreeOptions) -> Result<Vec<Slot>, AnalyzerError> {
    let read_dir = fs::read_dir(dir)
        .map_err(|source| AnalyzerError::Traversal { path: dir.to_path_buf(), source })?;

    let mut names: Vec<(String, PathBuf)> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !options.include_hidden && is_hidden_name(&name) {
                return None;
            }
            Some((name, entry.path()))
        })
        .collect();
    names.sort_by(|a, b| a.0.cmp(&b.0));

    let truncated = names.len() > options.max_items;
    names.truncate(options.max_items);

    let mut slots: Vec<Slot> = names
        .into_iter()
        .map(|(name, path)| {
            let is_dir = path.is_dir();
            Slot::Entry { name, path, is_dir }
        })
        .collect();
    if truncated {
        slots.push(Slot::More);
    }
    Ok(slots)
}

fn render_line(depth: usize, name: &str, is_dir: bool) -> String {
    let marker = if is_dir { "/" } else { "" };
    format!("{}{}{}{}", INDENT.repeat(depth), BRANCH, name, marker)
}
