//! Command-line interface for repo-analyzer
//!
//! Provides `analyze` and `info` subcommands sharing one set of selection options.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod analyze;
mod info;
mod selection;
mod utils;

/// Summarize a local repository into a single text file for LLM analysis
#[derive(Parser)]
#[command(name = "repo-analyzer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the directory tree and selected file contents to a summary file
    Analyze(Box<analyze::AnalyzeArgs>),

    /// Show the tree and the files that would be included, without writing
    Info(info::InfoArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Analyze(args) => analyze::run(*args),
        Commands::Info(args) => info::run(args),
    }
}
