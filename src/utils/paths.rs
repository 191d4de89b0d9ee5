//! Path helpers shared by the walkers and the writer

use std::path::Path;

/// Convert backslashes to forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Dot-prefixed names are hidden.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Case-insensitive suffix check of the file name against `extensions`
/// (each with its leading dot, e.g. ".py").
pub fn has_valid_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();
    extensions.iter().any(|ext| name.ends_with(ext.to_lowercase().as_str()))
}

/// Root-relative `/`-separated form of `path`, or the full path when it lies
/// outside `root`.
pub fn display_path(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => normalize_path(&rel.to_string_lossy()),
        _ => normalize_path(&path.to_string_lossy()),
    }
}
