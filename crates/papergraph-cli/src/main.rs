//! papergraph - build and publish an academic paper graph
//!
//! Seeds arXiv papers, enriches them from the arXiv and Semantic Scholar
//! APIs into a DuckDB store, and exports the graph as chunked JSON for a
//! static frontend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;
use papergraph_semantic_scholar::Direction;

#[derive(Parser)]
#[command(name = "papergraph")]
#[command(about = "Build and publish an academic paper graph")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./papergraph.toml or ~/.config/papergraph/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides [database] path)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Retries for rate-limited API calls
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Add an arXiv paper (URL or id) as pending
    Seed(cmd::seed::SeedArgs),
    /// Fetch arXiv metadata for pending papers
    Process(cmd::process::ProcessArgs),
    /// Fetch references from Semantic Scholar for pending papers
    References(cmd::related::RelatedArgs),
    /// Fetch citations from Semantic Scholar for pending papers
    Citations(cmd::related::RelatedArgs),
    /// Write the graph as chunked JSON plus a manifest
    Export(cmd::export::ExportArgs),
    /// Check an export against its manifest
    Verify(cmd::export::ExportArgs),
    /// Load an export from a URL or directory
    Load(cmd::load::LoadArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(papergraph_core::ProgressContext::new());

    // TTY: warn unless --debug, bars show activity. Otherwise info.
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    papergraph_core::init_logging(quiet, cli.debug, multi)?;

    papergraph_core::install_signal_handlers()
        .context("Failed to install signal handlers")?;

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    if let Some(n) = cli.max_retries {
        config.http.max_retries = n;
    }
    papergraph_core::set_http_config(config.http.to_core());

    match cli.command {
        Command::Seed(args) => cmd::seed::run(args, &config),
        Command::Process(args) => cmd::process::run(args, &config, &progress),
        Command::References(args) => {
            cmd::related::run(args, Direction::References, &config, &progress)
        }
        Command::Citations(args) => {
            cmd::related::run(args, Direction::Citations, &config, &progress)
        }
        Command::Export(args) => cmd::export::export(args, &config),
        Command::Verify(args) => cmd::export::verify(args, &config),
        Command::Load(args) => cmd::load::run(args, &progress),
        Command::Config => {
            cmd::print_config(&config);
            Ok(())
        }
    }
}
