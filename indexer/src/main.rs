use anyhow::Result;
use clap::{Parser, Subcommand};
use core::build_corpus;
use core::config::BuildConfig;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the inverted index over a corpus of web documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a corpus directory of newline-delimited JSON files
    Build {
        /// Corpus root directory (subdirectories of `{"url", "content"}` JSONL files)
        #[arg(long, default_value = "DEV/")]
        corpus: String,
        /// Output index directory
        #[arg(long, default_value = "index/")]
        out: String,
        /// Override the in-memory flush threshold, in bytes
        #[arg(long)]
        flush_threshold_bytes: Option<usize>,
        /// Use the 1 GiB large-corpus flush threshold preset
        #[arg(long, default_value_t = false)]
        large_corpus: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { corpus, out, flush_threshold_bytes, large_corpus } => {
            run_build(&corpus, &out, flush_threshold_bytes, large_corpus)
        }
    }
}

fn run_build(corpus: &str, out: &str, flush_threshold_bytes: Option<usize>, large_corpus: bool) -> Result<()> {
    let mut config = if large_corpus { BuildConfig::large_corpus() } else { BuildConfig::default() };
    if let Some(bytes) = flush_threshold_bytes {
        config.flush_threshold_bytes = bytes;
    }

    let summary = build_corpus(corpus, out, config)?;

    println!("files processed: {}", summary.files_processed);
    println!("unique tokens: {}", summary.unique_tokens);
    println!("total disk size (bytes): {}", summary.total_disk_size_bytes);
    tracing::info!(docs_indexed = summary.docs_indexed, "build complete");
    Ok(())
}
