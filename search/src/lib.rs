use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use core::config::QueryConfig;
use core::SearchSession;

/// Run the interactive search REPL: read a query line, evaluate it, print
/// ranked URLs and the elapsed time in seconds, repeat until EOF or a blank
/// line (spec §6: "interactive loop accepting a query string and printing
/// ranked URLs plus elapsed seconds").
pub fn run_repl<R: BufRead, W: Write>(
    index_dir: &Path,
    cache_capacity: usize,
    top_k: usize,
    mut input: R,
    mut output: W,
) -> Result<()> {
    let session = SearchSession::open(index_dir, QueryConfig { cache_capacity })?;

    loop {
        write!(output, "query> ")?;
        output.flush()?;

        let mut line = String::new();
        let bytes_read = input.read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            break;
        }

        let start = Instant::now();
        let urls = session.evaluate(query)?;
        let elapsed = start.elapsed().as_secs_f64();

        if urls.is_empty() {
            writeln!(output, "no results")?;
        } else {
            for (rank, url) in urls.iter().take(top_k).enumerate() {
                writeln!(output, "{}. {}", rank + 1, url)?;
            }
        }
        writeln!(output, "({elapsed:.2}s)")?;
    }
    Ok(())
}
