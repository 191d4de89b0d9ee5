//! Config file loading and environment overlay

use crate::domain::Config;
use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `REPO_ANALYZER_MAX_CHARS=600`.
pub const ENV_PREFIX: &str = "REPO_ANALYZER_";

const SECTION: &str = "repo-analyzer";

/// Load the file layer (explicit or discovered under `root`) and overlay the
/// environment on top of it.
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<Config> {
    let file_config = load_config_file(root, config_path)?;
    apply_env(file_config)
}

/// Overlay `REPO_ANALYZER_*` variables onto `base`.
pub fn apply_env(base: Config) -> Result<Config> {
    Figment::from(Serialized::defaults(base))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .context("Invalid REPO_ANALYZER_* environment configuration")
}

fn load_config_file(root: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(root),
    };

    let Some(config_file) = discovered else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "toml" => parse_toml_config(&content, &config_file),
        "yaml" | "yml" => parse_yaml_config(&content, &config_file),
        other => Err(anyhow::anyhow!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        )),
    };

    match parsed {
        Ok(cfg) => {
            tracing::debug!("Loaded config from {}", config_file.display());
            Ok(cfg)
        }
        Err(e) if explicit => Err(e),
        Err(e) => {
            tracing::warn!(
                "Ignoring auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            Ok(Config::default())
        }
    }
}

/// Parse TOML config, honouring an optional `[repo-analyzer]` section.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// Parse YAML config, honouring an optional `repo-analyzer:` mapping.
fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    // An empty document parses as null; treat it as "all defaults".
    if config_val.is_null() {
        return Ok(Config::default());
    }

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(root: &Path) -> Option<PathBuf> {
    let candidates = [
        "repo-analyzer.toml",
        ".repo-analyzer.toml",
        "repo-analyzer.yml",
        ".repo-analyzer.yml",
        "repo-analyzer.yaml",
        ".repo-analyzer.yaml",
    ];

    candidates.iter().map(|candidate| root.join(candidate)).find(|path| path.is_file())
}
