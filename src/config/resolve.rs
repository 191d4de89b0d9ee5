//! Validation of a merged [`Config`] into the immutable [`RunConfig`].

use crate::domain::{Config, RunConfig};
use crate::error::AnalyzerError;
use crate::scan::PatternSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolve relative paths against `cwd`, check the root is a readable
/// directory and fold pattern files into the pattern lists.
///
/// Root problems and malformed globs are fatal; they surface here, before any
/// output is produced.
pub fn resolve_run_config(config: Config, cwd: &Path) -> Result<RunConfig, AnalyzerError> {
    let requested_root = absolutize(config.path.as_deref().unwrap_or(Path::new(".")), cwd);
    let root = validate_root(&requested_root)?;

    let mut include_patterns = config.include_patterns;
    if let Some(file) = &config.include_file {
        let extra = read_pattern_file(&absolutize(file, cwd))?;
        super::merge::append_unique(&mut include_patterns, extra);
    }
    let mut ignore_patterns = config.ignore_patterns;
    if let Some(file) = &config.ignore_file {
        let extra = read_pattern_file(&absolutize(file, cwd))?;
        super::merge::append_unique(&mut ignore_patterns, extra);
    }
    PatternSet::new(&include_patterns)?;
    PatternSet::new(&ignore_patterns)?;

    let main_file = config.main_file.as_deref().map(|main| resolve_main_file(main, &root, cwd));
    let output_path = match &config.output {
        Some(output) => canonical_parent(&absolutize(output, cwd)),
        None => default_output_path(&root),
    };

    Ok(RunConfig {
        root,
        main_file,
        max_chars: config.max_chars,
        tree_depth: config.tree_depth,
        max_items: config.max_items,
        include_hidden: config.include_hidden,
        include_patterns,
        ignore_patterns,
        valid_extensions: config.valid_extensions,
        output_path,
        read_timeout: Duration::from_secs(config.read_timeout_secs),
        pattern_order: config.pattern_order,
        respect_gitignore: config.respect_gitignore,
        include_timestamp: config.include_timestamp,
    })
}

/// `<root>/<root-name>_summary.txt`
pub fn default_output_path(root: &Path) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "repo".to_string());
    root.join(format!("{}_summary.txt", name))
}

/// Read one glob per line; blank lines and `#` comments are skipped.
pub fn read_pattern_file(path: &Path) -> Result<Vec<String>, AnalyzerError> {
    let content = fs::read_to_string(path)
        .map_err(|source| AnalyzerError::PatternFile { path: path.to_path_buf(), source })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn validate_root(path: &Path) -> Result<PathBuf, AnalyzerError> {
    let canonical = path
        .canonicalize()
        .map_err(|source| AnalyzerError::RootAccess { path: path.to_path_buf(), source })?;
    if !canonical.is_dir() {
        return Err(AnalyzerError::NotADirectory(canonical));
    }
    fs::read_dir(&canonical)
        .map_err(|source| AnalyzerError::RootAccess { path: canonical.clone(), source })?;
    Ok(canonical)
}

/// Root-relative first, then relative to the working directory.
fn resolve_main_file(main: &Path, root: &Path, cwd: &Path) -> PathBuf {
    let candidate = if main.is_absolute() {
        main.to_path_buf()
    } else if root.join(main).exists() {
        root.join(main)
    } else {
        cwd.join(main)
    };
    candidate.canonicalize().unwrap_or(candidate)
}

/// Canonicalize the parent so the path compares equal to walked entries.
fn canonical_parent(path: &Path) -> PathBuf {
    match (path.parent().and_then(|p| p.canonicalize().ok()), path.file_name()) {
        (Some(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_is_fatal() {
        let tmp = TempDir::new().expect("tmp");
        let config = Config { path: Some(tmp.path().join("nope")), ..Config::default() };
        let err = resolve_run_config(config, tmp.path()).unwrap_err();
        assert!(matches!(err, AnalyzerError::RootAccess { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_root_must_be_directory() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("file.txt"), "x").expect("write");
        let config = Config { path: Some(PathBuf::from("file.txt")), ..Config::default() };
        let err = resolve_run_config(config, tmp.path()).unwrap_err();
        assert!(matches!(err, AnalyzerError::NotADirectory(_)));
    }

    #[test]
    fn test_default_output_path_uses_root_name() {
        let tmp = TempDir::new().expect("tmp");
        let root = tmp.path().join("project");
        fs::create_dir(&root).expect("mkdir");
        let config = Config { path: Some(root.clone()), ..Config::default() };
        let run = resolve_run_config(config, tmp.path()).expect("resolve");
        assert_eq!(
            run.output_path,
            root.canonicalize().expect("canon").join("project_summary.txt")
        );
        assert_eq!(run.project_name(), "project");
    }

    #[test]
    fn test_pattern_file_lines_follow_inline_patterns() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("files_to_include.txt"), "# wanted\nmain.py\n\n*.m\n*.py\n")
            .expect("write");
        let config = Config {
            path: Some(tmp.path().to_path_buf()),
            include_patterns: vec!["*.py".to_string()],
            include_file: Some(PathBuf::from("files_to_include.txt")),
            ..Config::default()
        };
        let run = resolve_run_config(config, tmp.path()).expect("resolve");
        assert_eq!(run.include_patterns, vec!["*.py", "main.py", "*.m"]);
    }

    #[test]
    fn test_missing_pattern_file_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let config = Config {
            path: Some(tmp.path().to_path_buf()),
            ignore_file: Some(PathBuf::from("missing.txt")),
            ..Config::default()
        };
        let err = resolve_run_config(config, tmp.path()).unwrap_err();
        assert!(matches!(err, AnalyzerError::PatternFile { .. }));
    }

    #[test]
    fn test_invalid_glob_is_rejected_early() {
        let tmp = TempDir::new().expect("tmp");
        let config = Config {
            path: Some(tmp.path().to_path_buf()),
            include_patterns: vec!["src/[".to_string()],
            ..Config::default()
        };
        let err = resolve_run_config(config, tmp.path()).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidPattern { .. }));
    }

    #[test]
    fn test_main_file_resolves_relative_to_root() {
        let tmp = TempDir::new().expect("tmp");
        let root = tmp.path().join("proj");
        fs::create_dir(&root).expect("mkdir");
        fs::write(root.join("main.m"), "helper(1)\n").expect("write");
        let config = Config {
            path: Some(root.clone()),
            main_file: Some(PathBuf::from("main.m")),
            ..Config::default()
        };
        let run = resolve_run_config(config, tmp.path()).expect("resolve");
        let expected = root.join("main.m").canonicalize().expect("canon");
        assert_eq!(run.main_file, Some(expected));
    }
}
