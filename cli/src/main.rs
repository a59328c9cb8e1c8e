use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use wordex::{build, output, query};
use wordex_core::{InvertedIndex, SharedIndex, WorkQueue, DEFAULT_WORKERS};

#[derive(Parser, Debug)]
#[command(name = "wordex")]
#[command(about = "Build a word-position index over text files and run ranked queries", long_about = None)]
struct Args {
    /// File or directory of text files to index
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    text: Option<PathBuf>,

    /// Write the inverted index as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "index.json")]
    index: Option<PathBuf>,

    /// Write per-location word counts as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "counts.json")]
    counts: Option<PathBuf>,

    /// File of query lines, one query per line
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    query: Option<PathBuf>,

    /// Write ranked query results as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "results.json")]
    results: Option<PathBuf>,

    /// Match index words exactly instead of by prefix
    #[arg(long)]
    exact: bool,

    /// Run indexing and querying on a worker pool of this size
    #[arg(long, num_args = 0..=1, default_missing_value = "5")]
    threads: Option<String>,
}

fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let start = Instant::now();

    match worker_count(&args) {
        Some(workers) => run_threaded(&args, workers),
        None => run_single(&args),
    }

    tracing::info!(elapsed = ?start.elapsed(), "all steps complete");
}

/// The configured pool size, or `None` when running single-threaded.
/// Unusable values fall back to the default rather than aborting.
fn worker_count(args: &Args) -> Option<usize> {
    let raw = args.threads.as_deref()?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::warn!(value = raw, fallback = DEFAULT_WORKERS, "invalid worker count");
            Some(DEFAULT_WORKERS)
        }
    }
}

fn run_single(args: &Args) {
    let mut index = InvertedIndex::new();

    if let Some(root) = usable_path(&args.text, "--text") {
        if let Err(err) = build::build(&mut index, root) {
            tracing::error!(path = %root.display(), %err, "unable to build the index");
        }
    }

    write_step(&args.index, index.entries(), "index");
    write_step(&args.counts, index.counts(), "counts");

    let mut results = query::QueryResults::new();
    if let Some(queries) = usable_path(&args.query, "--query") {
        match query::run(&index, queries, args.exact) {
            Ok(answered) => results = answered,
            Err(err) => {
                tracing::error!(path = %queries.display(), %err, "unable to run queries");
            }
        }
    }
    write_step(&args.results, &results, "results");
}

fn run_threaded(args: &Args, workers: usize) {
    let queue = WorkQueue::new(workers);
    let index = Arc::new(SharedIndex::new());
    tracing::info!(workers, "worker pool started");

    if let Some(root) = usable_path(&args.text, "--text") {
        if let Err(err) = build::build_parallel(&index, root, &queue) {
            tracing::error!(path = %root.display(), %err, "unable to build the index");
        }
    }

    {
        let snapshot = index.read();
        write_step(&args.index, snapshot.entries(), "index");
        write_step(&args.counts, snapshot.counts(), "counts");
    }

    let mut results = query::QueryResults::new();
    if let Some(queries) = usable_path(&args.query, "--query") {
        match query::run_parallel(&index, queries, args.exact, &queue) {
            Ok(answered) => results = answered,
            Err(err) => {
                tracing::error!(path = %queries.display(), %err, "unable to run queries");
            }
        }
    }
    write_step(&args.results, &results, "results");

    queue.shutdown();
}

/// A flag's path value, or `None` (with a report) when the flag was given
/// without one. Absent flags skip their step silently.
fn usable_path<'a>(value: &'a Option<PathBuf>, flag: &str) -> Option<&'a Path> {
    match value {
        Some(path) if path.as_os_str().is_empty() => {
            tracing::error!(flag, "flag given without a path value; step skipped");
            None
        }
        Some(path) => Some(path.as_path()),
        None => None,
    }
}

fn write_step<T: Serialize>(destination: &Option<PathBuf>, value: &T, step: &str) {
    if let Some(path) = destination {
        match output::write_json(value, path) {
            Ok(()) => tracing::info!(step, path = %path.display(), "wrote output"),
            Err(err) => {
                tracing::error!(step, path = %path.display(), %err, "unable to write output");
            }
        }
    }
}
