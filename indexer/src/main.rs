use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use docindex_core::discover::{discover_files, validate_root};
use docindex_core::{build_index, run_queries, OutputFormat, PipelineConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Index a directory tree in memory and answer tf-idf term queries from stdin", long_about = None)]
struct Cli {
    /// Directory to index
    #[arg(value_name = "DIRECTORY")]
    root: PathBuf,
    /// Number of worker threads (defaults to 4x available parallelism, capped at 32)
    #[arg(long, env = "DOCINDEX_WORKERS")]
    workers: Option<usize>,
    /// Output format for query answers
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    // stdout carries query answers; logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
    let cli = Cli::parse();

    validate_root(&cli.root)?;
    let paths = discover_files(&cli.root)?;

    let config = PipelineConfig { workers: cli.workers };
    let report = build_index(&paths, &config);
    tracing::info!(
        root = %cli.root.display(),
        files = paths.len(),
        workers = report.workers,
        indexed = report.indexed,
        skipped = report.skipped.len(),
        lost = report.lost,
        "index ready"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_queries(stdin.lock(), stdout.lock(), &report.engine, cli.format.into())
        .context("answering queries")?;
    Ok(())
}
