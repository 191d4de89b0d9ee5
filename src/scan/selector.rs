//! File selection: which files qualify for concatenation, and in what order.

use crate::domain::{PatternOrder, RunConfig};
use crate::error::AnalyzerError;
use crate::scan::PatternSet;
use crate::utils::{has_valid_extension, normalize_path};
use ignore::{DirEntry, WalkBuilder};
use std::path::{Path, PathBuf};

/// A file that passed the visibility, extension and ignore filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// Root-relative, `/`-separated.
    pub relative_path: String,
    /// Declaration index of the first include pattern it matched, if any.
    pub include_match: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub files_seen: usize,
    pub files_selected: usize,
    pub skipped_extension: usize,
    pub skipped_ignored: usize,
    pub skipped_unmatched: usize,
    pub walk_errors: usize,
}

/// Walks the whole tree (no depth cap) and applies the selection policy.
///
/// Ignore patterns always win over include patterns. With no include
/// patterns every eligible file is selected in walk order (entries sorted by
/// name at each level). Otherwise files are grouped by the first include
/// pattern they match, in declaration order, and with
/// [`PatternOrder::Reversed`] the grouped list is then reversed as a whole.
/// A file matching several include patterns appears once.
pub struct FileSelector {
    root: PathBuf,
    include: PatternSet,
    ignore: PatternSet,
    include_hidden: bool,
    valid_extensions: Vec<String>,
    pattern_order: PatternOrder,
    respect_gitignore: bool,
    excluded_paths: Vec<PathBuf>,
    stats: SelectionStats,
}

impl FileSelector {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            include: PatternSet::empty(),
            ignore: PatternSet::empty(),
            include_hidden: false,
            valid_extensions: crate::domain::default_valid_extensions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            pattern_order: PatternOrder::default(),
            respect_gitignore: false,
            excluded_paths: Vec::new(),
            stats: SelectionStats::default(),
        }
    }

    /// Selector configured from a run, with the output artifact excluded.
    pub fn from_config(config: &RunConfig) -> Result<Self, AnalyzerError> {
        Ok(Self::new(config.root.clone())
            .include_patterns(&config.include_patterns)?
            .ignore_patterns(&config.ignore_patterns)?
            .include_hidden(config.include_hidden)
            .valid_extensions(config.valid_extensions.clone())
            .pattern_order(config.pattern_order)
            .respect_gitignore(config.respect_gitignore)
            .exclude_path(config.output_path.clone()))
    }

    pub fn include_patterns(mut self, patterns: &[String]) -> Result<Self, AnalyzerError> {
        self.include = PatternSet::new(patterns)?;
        Ok(self)
    }

    pub fn ignore_patterns(mut self, patterns: &[String]) -> Result<Self, AnalyzerError> {
        self.ignore = PatternSet::new(patterns)?;
        Ok(self)
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Extensions such as ".py"; compared case-insensitively against the file name.
    pub fn valid_extensions(mut self, extensions: Vec<String>) -> Self {
        self.valid_extensions = extensions;
        self
    }

    pub fn pattern_order(mut self, order: PatternOrder) -> Self {
        self.pattern_order = order;
        self
    }

    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Never select `path` (used for the output artifact itself).
    pub fn exclude_path(mut self, path: PathBuf) -> Self {
        self.excluded_paths.push(path);
        self
    }

    /// Run the selection and return candidates in output order.
    pub fn select(&mut self) -> Vec<Candidate> {
        self.stats = SelectionStats::default();
        let eligible = self.walk();

        let selected = if self.include.is_empty() {
            eligible
        } else {
            self.group_by_pattern(eligible)
        };
        self.stats.files_selected = selected.len();
        selected
    }

    /// Convenience over [`FileSelector::select`] returning absolute paths.
    pub fn select_paths(&mut self) -> Vec<PathBuf> {
        self.select().into_iter().map(|c| c.path).collect()
    }

    pub fn stats(&self) -> &SelectionStats {
        &self.stats
    }

    fn group_by_pattern(&mut self, eligible: Vec<Candidate>) -> Vec<Candidate> {
        let (matched, unmatched): (Vec<_>, Vec<_>) =
            eligible.into_iter().partition(|c| c.include_match.is_some());
        self.stats.skipped_unmatched = unmatched.len();

        let mut grouped = Vec::with_capacity(matched.len());
        for idx in 0..self.include.len() {
            grouped.extend(matched.iter().filter(|c| c.include_match == Some(idx)).cloned());
        }
        if self.pattern_order == PatternOrder::Reversed {
            grouped.reverse();
        }
        grouped
    }

    fn walk(&mut self) -> Vec<Candidate> {
        let walker = self.walker();
        self.absorb(walker)
    }

    fn walker(&self) -> ignore::Walk {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .hidden(!self.include_hidden)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        if !self.ignore.is_empty() {
            let ignore = self.ignore.clone();
            let root = self.root.clone();
            builder.filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                if !is_dir || entry.depth() == 0 {
                    return true;
                }
                match entry.path().strip_prefix(&root) {
                    Ok(rel) => !ignore.is_match(&normalize_path(&rel.to_string_lossy())),
                    Err(_) => true,
                }
            });
        }
        builder.build()
    }

    /// Filter walk results into candidates. Entries the walk failed on are
    /// counted and skipped.
    fn absorb<I>(&mut self, entries: I) -> Vec<Candidate>
    where
        I: IntoIterator<Item = Result<DirEntry, ignore::Error>>,
    {
        let mut candidates = Vec::new();
        for result in entries {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    self.stats.walk_errors += 1;
                    tracing::warn!("Skipping unreadable entry during selection: {}", err);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || self.excluded_paths.iter().any(|p| p == path) {
                continue;
            }
            self.stats.files_seen += 1;

            if let Some(candidate) = self.evaluate(path) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    fn evaluate(&mut self, path: &Path) -> Option<Candidate> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let relative_path = normalize_path(&rel.to_string_lossy());

        if !has_valid_extension(path, &self.valid_extensions) {
            self.stats.skipped_extension += 1;
            return None;
        }

        if let Some(pattern) = self.ignore.first_matching_pattern(&relative_path) {
            tracing::debug!("{} excluded by ignore pattern '{}'", relative_path, pattern);
            self.stats.skipped_ignored += 1;
            return None;
        }

        let include_match = self.include.first_match(&relative_path);
        Some(Candidate { path: path.to_path_buf(), relative_path, include_match })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn rel_paths(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.relative_path.as_str()).collect()
    }

    fn fixture() -> TempDir {
        let tmp = TempDir::new().expect("tmp dir");
        let root = tmp.path();
        fs::create_dir_all(root.join("pkg/sub")).expect("mkdir");
        fs::write(root.join("a.py"), "a").expect("write");
        fs::write(root.join("b.md"), "b").expect("write");
        fs::write(root.join("pkg/c.py"), "c").expect("write");
        fs::write(root.join("pkg/sub/d.m"), "d").expect("write");
        fs::write(root.join("pkg/e.rs"), "e").expect("write");
        tmp
    }

    #[test]
    fn test_empty_include_selects_every_eligible_file_once() {
        let tmp = fixture();
        let mut selector = FileSelector::new(tmp.path().to_path_buf());
        let selected = selector.select();

        assert_eq!(rel_paths(&selected), vec!["a.py", "b.md", "pkg/c.py", "pkg/sub/d.m"]);
        assert_eq!(selector.stats().skipped_extension, 1);
        assert_eq!(selector.stats().files_seen, 5);
    }

    #[test]
    fn test_ignore_beats_include() {
        let tmp = TempDir::new().expect("tmp dir");
        fs::write(tmp.path().join("x.py"), "x").expect("write");
        fs::write(tmp.path().join("x.log"), "log").expect("write");

        let mut selector = FileSelector::new(tmp.path().to_path_buf())
            .valid_extensions(strings(&[".py", ".log"]))
            .include_patterns(&strings(&["*.py", "x.*"]))
            .expect("include")
            .ignore_patterns(&strings(&["*.log"]))
            .expect("ignore");
        let selected = selector.select();

        assert_eq!(rel_paths(&selected), vec!["x.py"]);
        assert_eq!(selector.stats().skipped_ignored, 1);
    }

    #[test]
    fn test_grouped_order_is_reversed_by_default() {
        let tmp = fixture();
        let mut selector = FileSelector::new(tmp.path().to_path_buf())
            .include_patterns(&strings(&["*.m", "*.py"]))
            .expect("include");
        let selected = selector.select();

        // grouped: [pkg/sub/d.m] + [a.py, pkg/c.py], then reversed
        assert_eq!(rel_paths(&selected), vec!["pkg/c.py", "a.py", "pkg/sub/d.m"]);
        assert_eq!(selector.stats().skipped_unmatched, 1);
    }

    #[test]
    fn test_declared_order_keeps_grouping() {
        let tmp = fixture();
        let mut selector = FileSelector::new(tmp.path().to_path_buf())
            .include_patterns(&strings(&["*.m", "*.py"]))
            .expect("include")
            .pattern_order(PatternOrder::Declared);
        let selected = selector.select();

        assert_eq!(rel_paths(&selected), vec!["pkg/sub/d.m", "a.py", "pkg/c.py"]);
    }

    #[test]
    fn test_file_matching_several_patterns_appears_once_in_first_group() {
        let tmp = fixture();
        let mut selector = FileSelector::new(tmp.path().to_path_buf())
            .include_patterns(&strings(&["pkg/*.py", "*.py"]))
            .expect("include")
            .pattern_order(PatternOrder::Declared);
        let selected = selector.select();

        assert_eq!(rel_paths(&selected), vec!["pkg/c.py", "a.py"]);
        assert_eq!(selected[0].include_match, Some(0));
        assert_eq!(selected[1].include_match, Some(1));

        let mut reversed = FileSelector::new(tmp.path().to_path_buf())
            .include_patterns(&strings(&["pkg/*.py", "*.py"]))
            .expect("include");
        assert_eq!(rel_paths(&reversed.select()), vec!["a.py", "pkg/c.py"]);
    }

    #[test]
    fn test_hidden_files_and_dirs_follow_policy() {
        let tmp = TempDir::new().expect("tmp dir");
        let root = tmp.path();
        fs::create_dir(root.join(".config")).expect("mkdir");
        fs::write(root.join(".config/settings.json"), "{}").expect("write");
        fs::write(root.join(".notes.txt"), "n").expect("write");
        fs::write(root.join("visible.txt"), "v").expect("write");

        let mut hidden_off = FileSelector::new(root.to_path_buf());
        assert_eq!(rel_paths(&hidden_off.select()), vec!["visible.txt"]);

        let mut hidden_on = FileSelector::new(root.to_path_buf()).include_hidden(true);
        assert_eq!(
            rel_paths(&hidden_on.select()),
            vec![".config/settings.json", ".notes.txt", "visible.txt"]
        );
    }

    #[test]
    fn test_selection_ignores_tree_depth() {
        let tmp = TempDir::new().expect("tmp dir");
        let deep = tmp.path().join("a/b/c/d/e/f/g/h/i/j/k/l");
        fs::create_dir_all(&deep).expect("mkdir");
        fs::write(deep.join("deep.py"), "print(1)").expect("write");

        let mut selector = FileSelector::new(tmp.path().to_path_buf());
        assert_eq!(rel_paths(&selector.select()), vec!["a/b/c/d/e/f/g/h/i/j/k/l/deep.py"]);
    }

    #[test]
    fn test_ignore_pattern_prunes_directories() {
        let tmp = fixture();
        let mut selector = FileSelector::new(tmp.path().to_path_buf())
            .ignore_patterns(&strings(&["sub"]))
            .expect("ignore");
        assert_eq!(rel_paths(&selector.select()), vec!["a.py", "b.md", "pkg/c.py"]);
    }

    #[test]
    fn test_excluded_output_path_is_never_selected() {
        let tmp = fixture();
        let output = tmp.path().join("report_summary.txt");
        fs::write(&output, "previous run").expect("write");

        let mut selector = FileSelector::new(tmp.path().to_path_buf()).exclude_path(output);
        assert!(!rel_paths(&selector.select()).contains(&"report_summary.txt"));
    }

    #[test]
    fn test_walk_error_is_counted_and_skipped() {
        let tmp = fixture();
        let mut selector = FileSelector::new(tmp.path().to_path_buf());
        let mut entries: Vec<_> = selector.walker().collect();
        let unreadable = io::Error::new(io::ErrorKind::PermissionDenied, "pkg/locked");
        entries.insert(2, Err(ignore::Error::Io(unreadable)));

        let selected = selector.absorb(entries);
        assert_eq!(rel_paths(&selected), vec!["a.py", "b.md", "pkg/c.py", "pkg/sub/d.m"]);
        assert_eq!(selector.stats().walk_errors, 1);
        assert_eq!(selector.stats().files_seen, 5);
    }

    #[test]
    fn test_gitignore_is_opt_in() {
        let tmp = fixture();
        fs::write(tmp.path().join(".gitignore"), "pkg/\n").expect("write");

        let mut plain = FileSelector::new(tmp.path().to_path_buf());
        assert!(rel_paths(&plain.select()).contains(&"pkg/c.py"));

        let mut respecting = FileSelector::new(tmp.path().to_path_buf()).respect_gitignore(true);
        assert_eq!(rel_paths(&respecting.select()), vec!["a.py", "b.md"]);
    }
}
