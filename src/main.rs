//! repo-analyzer: summarize a repository's tree and sources into one text file

use anyhow::Result;

fn main() -> Result<()> {
    repo_analyzer::cli::run()
}
