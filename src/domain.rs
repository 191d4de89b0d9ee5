//! Core data types shared by the config layer, the engine and the CLI.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TREE_DEPTH: usize = 10;
pub const DEFAULT_MAX_ITEMS: usize = 50;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;

/// File extensions eligible for concatenation when none are configured.
pub fn default_valid_extensions() -> &'static [&'static str] {
    &[
        ".txt", ".py", ".md", ".json", ".xml", ".html", ".css", ".js", ".java", ".cpp", ".c",
        ".hpp", ".h", ".m", ".ipynb",
    ]
}

/// How files matched by include patterns are ordered in the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternOrder {
    /// Group by pattern in declaration order, then reverse the whole list.
    #[default]
    Reversed,
    /// Group by pattern in declaration order.
    Declared,
}

/// Configuration as read from a config file and the environment.
///
/// Every field has a default so partial files are valid. CLI overrides are
/// merged on top before the record is resolved into a [`RunConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub path: Option<PathBuf>,
    pub main_file: Option<PathBuf>,
    pub max_chars: Option<usize>,
    pub tree_depth: usize,
    pub max_items: usize,
    pub include_hidden: bool,
    #[serde(deserialize_with = "deserialize_glob_list")]
    pub include_patterns: Vec<String>,
    pub include_file: Option<PathBuf>,
    #[serde(deserialize_with = "deserialize_glob_list")]
    pub ignore_patterns: Vec<String>,
    pub ignore_file: Option<PathBuf>,
    #[serde(deserialize_with = "deserialize_extension_list")]
    pub valid_extensions: Vec<String>,
    pub output: Option<PathBuf>,
    pub read_timeout_secs: u64,
    pub pattern_order: PatternOrder,
    pub respect_gitignore: bool,
    pub include_timestamp: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            main_file: None,
            max_chars: None,
            tree_depth: DEFAULT_TREE_DEPTH,
            max_items: DEFAULT_MAX_ITEMS,
            include_hidden: false,
            include_patterns: Vec::new(),
            include_file: None,
            ignore_patterns: Vec::new(),
            ignore_file: None,
            valid_extensions: default_valid_extensions().iter().map(|s| s.to_string()).collect(),
            output: None,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            pattern_order: PatternOrder::default(),
            respect_gitignore: false,
            include_timestamp: true,
        }
    }
}

/// The immutable configuration record a run operates on.
///
/// Built once by [`crate::config::resolve_run_config`]; the root is canonical
/// and known to be a readable directory.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub root: PathBuf,
    pub main_file: Option<PathBuf>,
    pub max_chars: Option<usize>,
    pub tree_depth: usize,
    pub max_items: usize,
    pub include_hidden: bool,
    pub include_patterns: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub valid_extensions: Vec<String>,
    pub output_path: PathBuf,
    pub read_timeout: Duration,
    pub pattern_order: PatternOrder,
    pub respect_gitignore: bool,
    pub include_timestamp: bool,
}

impl RunConfig {
    /// A config rooted at `root` with every other setting at its default.
    ///
    /// `root` is taken as-is; callers needing validation go through
    /// [`crate::config::resolve_run_config`].
    pub fn for_root(root: PathBuf) -> Self {
        let defaults = Config::default();
        let output_path = crate::config::default_output_path(&root);
        Self {
            root,
            main_file: None,
            max_chars: None,
            tree_depth: defaults.tree_depth,
            max_items: defaults.max_items,
            include_hidden: defaults.include_hidden,
            include_patterns: Vec::new(),
            ignore_patterns: Vec::new(),
            valid_extensions: defaults.valid_extensions,
            output_path,
            read_timeout: Duration::from_secs(defaults.read_timeout_secs),
            pattern_order: defaults.pattern_order,
            respect_gitignore: defaults.respect_gitignore,
            include_timestamp: defaults.include_timestamp,
        }
    }

    /// Name used in the artifact header: the root directory's base name.
    pub fn project_name(&self) -> String {
        self.root.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Characters of file content written (the budget consumed).
    pub chars_written: usize,
    /// Files whose content made it into the artifact, main file included.
    pub files_included: usize,
    /// Files abandoned after a read failure or timeout, in run order.
    pub skipped: Vec<SkippedFile>,
    pub budget_exhausted: bool,
}

impl RunSummary {
    pub fn files_skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// A file left out of the artifact because its read did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// The per-file read timeout elapsed.
    TimedOut { after: Duration },
    /// Opening or reading failed; holds the error message.
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimedOut { after } => write!(f, "timed out after {:.1}s", after.as_secs_f64()),
            Self::Unreadable(message) => f.write_str(message),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    Csv(String),
    List(Vec<String>),
}

impl StringOrList {
    fn into_items(self) -> Vec<String> {
        let raw = match self {
            Self::Csv(s) => s.split(',').map(str::to_string).collect(),
            Self::List(items) => items,
        };
        raw.into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

fn deserialize_glob_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringOrList::deserialize(deserializer)?.into_items())
}

fn deserialize_extension_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringOrList::deserialize(deserializer)?
        .into_items()
        .into_iter()
        .map(|ext| normalize_extension(&ext))
        .collect())
}

/// Lower-case an extension and give it a leading dot (`"PY"` -> `".py"`).
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
