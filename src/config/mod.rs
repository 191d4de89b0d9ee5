//! Configuration loading and merging
//!
//! Handles loading from config files, environment variables, and CLI arguments
//! with proper precedence (CLI > Env > File > Defaults), then resolves the
//! result into the immutable [`crate::domain::RunConfig`].

pub mod loader;
pub mod merge;
pub mod resolve;

pub use loader::{apply_env, load_config};
pub use merge::{merge_cli_with_config, CliOverrides};
pub use resolve::{default_output_path, read_pattern_file, resolve_run_config};
