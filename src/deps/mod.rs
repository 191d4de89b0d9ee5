//! Lexical dependency discovery from a seed file.
//!
//! A [`Dialect`] knows how to name the unit a file defines and how to spot
//! references to other units in source text. The resolver expands from the
//! seed until no new unit files turn up.

use crate::scan::FileSelector;
use crate::utils::read_text_lossy;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

pub mod matlab;

pub use matlab::MatlabDialect;

/// A source convention where each file defines one unit named after the file.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether a seed file at `path` is written in this dialect.
    fn applies_to(&self, path: &Path) -> bool;

    /// The unit a file defines, or `None` if it defines none.
    fn unit_name(&self, path: &Path) -> Option<String>;

    /// Names of units referenced by `text`.
    fn scan_references(&self, text: &str) -> BTreeSet<String>;
}

static DIALECTS: &[&dyn Dialect] = &[&MatlabDialect];

/// The dialect tracking dependencies for a main file at `path`, if any.
pub fn dialect_for(path: &Path) -> Option<&'static dyn Dialect> {
    DIALECTS.iter().copied().find(|d| d.applies_to(path))
}

/// Unit files under a root, keyed by unit name.
pub struct UnitIndex {
    units: HashMap<String, Vec<PathBuf>>,
}

impl UnitIndex {
    /// Walk `root` once with the selector's hidden and extension policy.
    pub fn build(
        root: &Path,
        extensions: &[String],
        include_hidden: bool,
        dialect: &dyn Dialect,
    ) -> Self {
        let mut selector = FileSelector::new(root.to_path_buf())
            .include_hidden(include_hidden)
            .valid_extensions(extensions.to_vec());

        let mut units: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for path in selector.select_paths() {
            if let Some(name) = dialect.unit_name(&path) {
                units.entry(name).or_default().push(path);
            }
        }
        Self { units }
    }

    pub fn lookup(&self, name: &str) -> &[PathBuf] {
        self.units.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of indexed files across all unit names.
    pub fn file_count(&self) -> usize {
        self.units.values().map(Vec::len).sum()
    }
}

/// Files reachable from `seed` by following references, seed included.
///
/// Files that cannot be read contribute no references. Cycles end at the
/// visited check.
pub fn resolve_dependencies(
    root: &Path,
    seed: &Path,
    extensions: &[String],
    include_hidden: bool,
    dialect: &dyn Dialect,
) -> BTreeSet<PathBuf> {
    let index = UnitIndex::build(root, extensions, include_hidden, dialect);
    tracing::debug!("Indexed {} {} unit files under {}", index.file_count(), dialect.name(), root.display());
    expand(seed, &index, dialect)
}

fn expand(seed: &Path, index: &UnitIndex, dialect: &dyn Dialect) -> BTreeSet<PathBuf> {
    let mut visited = BTreeSet::new();
    let mut stack = vec![seed.to_path_buf()];

    while let Some(current) = stack.pop() {
        if visited.contains(&current) {
            continue;
        }

        let references = match read_text_lossy(&current) {
            Ok(text) => dialect.scan_references(&text),
            Err(err) => {
                tracing::warn!("Cannot scan {} for references: {}", current.display(), err);
                BTreeSet::new()
            }
        };
        for name in &references {
            stack.extend(index.lookup(name).iter().filter(|p| !visited.contains(*p)).cloned());
        }
        visited.insert(current);
    }
    visited
}
