//! MATLAB: one function per `.m` file, named after the file.

use super::Dialect;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;

/// An identifier directly followed by `(`. Over-matches keywords, indexing
/// and text inside strings or comments.
static CALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\w+)\s*\(").expect("valid call regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct MatlabDialect;

impl Dialect for MatlabDialect {
    fn name(&self) -> &'static str {
        "matlab"
    }

    fn applies_to(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "m")
    }

    fn unit_name(&self, path: &Path) -> Option<String> {
        if !self.applies_to(path) {
            return None;
        }
        path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
    }

    fn scan_references(&self, text: &str) -> BTreeSet<String> {
        text.lines()
            .flat_map(|line| CALL_RE.captures_iter(line))
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scans_calls_per_line() {
        let text = "function out = main(x)\n  y = helper (x);\n  plot_it(\n y)\nend\n";
        let found = MatlabDialect.scan_references(text);
        let expected: BTreeSet<String> =
            ["main", "helper", "plot_it"].iter().map(|s| s.to_string()).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_call_split_across_lines_is_missed() {
        let found = MatlabDialect.scan_references("z = compute\n(3);\n");
        assert!(!found.contains("compute"));
    }

    #[test]
    fn test_unit_name_only_for_m_files() {
        assert_eq!(MatlabDialect.unit_name(Path::new("lib/helper.m")), Some("helper".into()));
        assert_eq!(MatlabDialect.unit_name(Path::new("lib/helper.py")), None);
        assert!(MatlabDialect.applies_to(Path::new("main.m")));
        assert!(!MatlabDialect.applies_to(Path::new("main.mat")));
    }
}
