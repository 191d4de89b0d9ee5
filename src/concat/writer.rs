//! Artifact assembly: tree, main file, then the selected files under one budget.

use super::budget::ReadBudget;
use super::reader::{read_bounded_path, FileSource, FsSource, ReadOutcome};
use crate::deps::{dialect_for, resolve_dependencies};
use crate::domain::{RunConfig, RunSummary, SkipReason, SkippedFile};
use crate::error::AnalyzerError;
use crate::render::instructions;
use crate::scan::{render_tree, select_files, Candidate, SelectionStats, TreeOptions};
use crate::utils::display_path;
use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything decided before the first byte of content is read.
#[derive(Debug, Clone)]
pub struct Plan {
    pub tree: Vec<String>,
    pub main_file: Option<PathBuf>,
    /// Dialect that narrowed the selection, if the main file has one.
    pub dialect: Option<&'static str>,
    /// Remaining files in output order, main file excluded.
    pub files: Vec<Candidate>,
    pub selection: SelectionStats,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.main_file.is_none() && self.files.is_empty()
    }
}

/// Drives one aggregation run over a resolved [`RunConfig`].
///
/// Reads happen strictly in output order, each charging the shared
/// [`ReadBudget`] before the next starts.
pub struct Aggregator<'a, S: FileSource = FsSource> {
    config: &'a RunConfig,
    files: S,
}

impl<'a> Aggregator<'a, FsSource> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self::with_source(config, FsSource)
    }
}

impl<'a, S: FileSource> Aggregator<'a, S> {
    pub fn with_source(config: &'a RunConfig, files: S) -> Self {
        Self { config, files }
    }

    /// Render the tree and settle the ordered file list.
    ///
    /// Fails only when the root cannot be listed.
    pub fn plan(&self) -> Result<Plan, AnalyzerError> {
        let config = self.config;
        let tree = render_tree(&config.root, TreeOptions::from(config)).map_err(|err| match err {
            AnalyzerError::Traversal { path, source } => AnalyzerError::RootAccess { path, source },
            other => other,
        })?;
        let (mut files, selection) = select_files(config)?;

        let mut dialect = None;
        if let Some(main) = &config.main_file {
            if let Some(d) = dialect_for(main) {
                let reachable = resolve_dependencies(
                    &config.root,
                    main,
                    &config.valid_extensions,
                    config.include_hidden,
                    d,
                );
                tracing::debug!("{} files reachable from {}", reachable.len(), main.display());
                files.retain(|c| reachable.contains(&c.path));
                dialect = Some(d.name());
            }
            files.retain(|c| !same_file(&c.path, main));
        }

        Ok(Plan { tree, main_file: config.main_file.clone(), dialect, files, selection })
    }

    /// Write the artifact for `plan` into `out`.
    pub fn write_plan<W: Write>(&self, plan: &Plan, out: &mut W) -> Result<RunSummary, AnalyzerError> {
        let config = self.config;
        let generated_at = config.include_timestamp.then(Local::now);
        let header = instructions(&config.project_name(), &config.include_patterns, generated_at);

        write_str(out, &header)?;
        write_str(out, "Directory Structure:\n")?;
        write_str(out, &plan.tree.join("\n"))?;
        write_str(out, "\n\nConcatenated Files:\n")?;

        let mut budget = ReadBudget::new(config.max_chars);
        let mut summary = RunSummary::default();

        if let Some(main) = &plan.main_file {
            let content = self.read_one(main, &mut budget, &mut summary);
            let display = display_path(main, &config.root);
            write_str(out, &format!("\n\n--- {} (Main File) ---\n\n", display))?;
            if let Some(content) = content {
                write_str(out, &content)?;
            }
        }

        for candidate in &plan.files {
            if budget.is_exhausted() {
                break;
            }
            let Some(content) = self.read_one(&candidate.path, &mut budget, &mut summary) else {
                continue;
            };
            if content.is_empty() {
                continue;
            }
            write_str(out, &format!("\n\n--- {} ---\n\n", candidate.relative_path))?;
            write_str(out, &content)?;
        }

        summary.chars_written = budget.consumed();
        summary.budget_exhausted = budget.is_exhausted();
        if let (true, Some(max)) = (summary.budget_exhausted, budget.limit()) {
            tracing::info!("Reached maximum character limit: {}", max);
        }
        Ok(summary)
    }

    /// Plan the run and write the artifact to the configured output path.
    pub fn run(&self) -> Result<RunSummary, AnalyzerError> {
        let plan = self.plan()?;
        self.run_plan(&plan)
    }

    /// Write `plan` to the configured output path, flushing on every exit.
    pub fn run_plan(&self, plan: &Plan) -> Result<RunSummary, AnalyzerError> {
        let file = File::create(&self.config.output_path).map_err(AnalyzerError::Output)?;
        let mut out = BufWriter::new(file);
        let written = self.write_plan(plan, &mut out);
        let flushed = out.flush().map_err(AnalyzerError::Output);
        let summary = written?;
        flushed?;
        Ok(summary)
    }

    /// Read one file under the budget; `None` when it was skipped.
    fn read_one(
        &self,
        path: &Path,
        budget: &mut ReadBudget,
        summary: &mut RunSummary,
    ) -> Option<String> {
        let timeout = Some(self.config.read_timeout).filter(|t| !t.is_zero());
        match read_bounded_path(&self.files, path, budget, timeout) {
            Ok(ReadOutcome::Content(content)) => {
                tracing::debug!("Read {} ({} chars)", path.display(), content.chars().count());
                if !content.is_empty() {
                    summary.files_included += 1;
                }
                Some(content)
            }
            Ok(ReadOutcome::TimedOut { elapsed }) => {
                tracing::warn!(
                    "Skipping {}: read exceeded {} (gave up after {})",
                    path.display(),
                    format_secs(self.config.read_timeout),
                    format_secs(elapsed)
                );
                summary.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: SkipReason::TimedOut { after: elapsed },
                });
                None
            }
            Err(err) => {
                tracing::warn!("Skipping file: {}", err);
                summary.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: SkipReason::Unreadable(err.to_string()),
                });
                None
            }
        }
    }
}

fn write_str<W: Write>(out: &mut W, text: &str) -> Result<(), AnalyzerError> {
    out.write_all(text.as_bytes()).map_err(AnalyzerError::Output)
}

fn same_file(a: &Path, b: &Path) -> bool {
    a == b
        || match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
}

fn format_secs(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}
