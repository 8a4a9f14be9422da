use std::io::{stdin, stdout};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Interactively query a built inverted index", long_about = None)]
struct Args {
    /// Index directory produced by the `build` binary
    #[arg(long, default_value = "index/")]
    index: PathBuf,
    /// Bounded LRU cache size for posting lists
    #[arg(long, default_value_t = 1000)]
    cache_capacity: usize,
    /// Maximum number of ranked URLs to print per query
    #[arg(long, default_value_t = 10)]
    top_k: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let stdin = stdin();
    let stdout = stdout();
    search::run_repl(&args.index, args.cache_capacity, args.top_k, stdin.lock(), stdout.lock())
}
