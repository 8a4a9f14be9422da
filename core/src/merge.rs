use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::build::parse_postings_u32;
use crate::error::{IndexError, Result};
use crate::DocId;

/// One open partial-index stream, positioned at its current (unread) record.
struct Stream {
    path: PathBuf,
    reader: csv::Reader<std::io::BufReader<File>>,
    current: Option<(String, Vec<(DocId, u32)>)>,
    last_term: Option<String>,
}

impl Stream {
    fn open(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(std::io::BufReader::new(File::open(path)?));
        let current = Self::read_next(&mut reader)?;
        let last_term = current.as_ref().map(|(t, _)| t.clone());
        Ok(Self { path: path.to_path_buf(), reader, current, last_term })
    }

    fn read_next(reader: &mut csv::Reader<std::io::BufReader<File>>) -> Result<Option<(String, Vec<(DocId, u32)>)>> {
        let mut record = csv::StringRecord::new();
        if reader.read_record(&mut record)? {
            let term = record.get(0).unwrap_or_default().to_string();
            let postings = parse_postings_u32(record.get(1).unwrap_or_default());
            Ok(Some((term, postings)))
        } else {
            Ok(None)
        }
    }

    /// A partial index file is written once, already sorted by
    /// `IndexBuilder::flush`, so every record the merge reads back from it
    /// must have a term lexicographically >= the one before it. A violation
    /// means the partial was corrupted or hand-edited after the build wrote
    /// it, not a condition the merge can recover from.
    fn advance(&mut self) -> Result<()> {
        self.current = Self::read_next(&mut self.reader)?;
        if let Some((term, _)) = &self.current {
            if self.last_term.as_deref().is_some_and(|prev| term.as_str() < prev) {
                return Err(IndexError::MergeInvariantViolation {
                    term: term.clone(),
                    detail: format!("partial {} is not sorted by term", self.path.display()),
                });
            }
            self.last_term = Some(term.clone());
        }
        Ok(())
    }
}

/// Shard output writers, opened lazily on first use and keyed by the
/// shard's leading character (`None` = the non-alphabetic shard).
struct ShardWriters {
    dir: PathBuf,
    writers: HashMap<Option<char>, csv::Writer<BufWriter<File>>>,
}

impl ShardWriters {
    fn new(dir: PathBuf) -> Self {
        Self { dir, writers: HashMap::new() }
    }

    fn shard_key(term: &str) -> Option<char> {
        term.chars().next().and_then(|c| {
            let lower = c.to_ascii_lowercase();
            if lower.is_ascii_alphabetic() {
                Some(lower)
            } else {
                None
            }
        })
    }

    fn shard_path(&self, key: Option<char>) -> PathBuf {
        match key {
            Some(c) => self.dir.join(format!("index_{c}.csv")),
            None => self.dir.join("index.csv"),
        }
    }

    fn writer_for(&mut self, key: Option<char>) -> Result<&mut csv::Writer<BufWriter<File>>> {
        if !self.writers.contains_key(&key) {
            std::fs::create_dir_all(&self.dir)?;
            let path = self.shard_path(key);
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(BufWriter::new(File::create(path)?));
            writer.write_record(["token", "postings"])?;
            self.writers.insert(key, writer);
        }
        Ok(self.writers.get_mut(&key).expect("just inserted"))
    }

    fn write_term(&mut self, term: &str, postings_cell: &str) -> Result<()> {
        let key = Self::shard_key(term);
        let writer = self.writer_for(key)?;
        writer.write_record([term, postings_cell])?;
        Ok(())
    }

    fn finish(self) -> Result<()> {
        for (_, mut writer) in self.writers {
            writer.flush()?;
        }
        Ok(())
    }
}

pub struct MergeStats {
    pub unique_terms: usize,
}

/// K-way merge every partial index into the 27-shard final index, computing
/// TF-IDF on merged postings along the way. Deletes the partials on success.
pub fn merge_partials(partial_paths: &[PathBuf], num_docs: u32, out_dir: &Path) -> Result<MergeStats> {
    let mut streams: Vec<Stream> = partial_paths.iter().map(|p| Stream::open(p)).collect::<Result<_>>()?;
    let mut shards = ShardWriters::new(out_dir.to_path_buf());
    let n = num_docs.max(1) as f64;
    let mut unique_terms = 0usize;

    loop {
        let min_term = streams
            .iter()
            .filter_map(|s| s.current.as_ref().map(|(t, _)| t.clone()))
            .min();
        let Some(min_term) = min_term else { break };

        let mut merged: Vec<(DocId, u32)> = Vec::new();
        for stream in streams.iter_mut() {
            if let Some((term, _)) = &stream.current {
                if *term == min_term {
                    let (_, postings) = stream.current.take().unwrap();
                    merged.extend(postings);
                    stream.advance()?;
                }
            }
        }

        // Sum scores for any (doc_id, term) pair that recurred across
        // partials, preserving correctness even though a single DocProcessor
        // call and a single flush make that case impossible in practice.
        let mut by_doc: HashMap<DocId, u64> = HashMap::new();
        for (doc_id, score) in merged {
            *by_doc.entry(doc_id).or_insert(0) += score as u64;
        }
        let mut postings: Vec<(DocId, u64)> = by_doc.into_iter().collect();
        postings.sort_by_key(|(doc_id, _)| *doc_id);

        let df = postings.len().max(1) as f64;
        let rendered = postings
            .iter()
            .map(|(doc_id, raw)| {
                let tfidf = tfidf(*raw as f64, n, df);
                format!("{doc_id}:{tfidf}")
            })
            .collect::<Vec<_>>()
            .join(", ");

        shards.write_term(&min_term, &rendered)?;
        unique_terms += 1;
    }

    shards.finish()?;
    for path in partial_paths {
        std::fs::remove_file(path).ok();
    }

    info!(unique_terms, partials = partial_paths.len(), "merge complete");
    Ok(MergeStats { unique_terms })
}

/// `tfidf(raw, N, df) = round((1 + log10(raw)) * log10(N/df), 2)`. `raw == 0`
/// never reaches this function (a posting only exists because the term was
/// observed at least once in that document).
pub fn tfidf(raw: f64, n: f64, df: f64) -> f64 {
    let value = (1.0 + raw.log10()) * (n / df).log10();
    (value * 100.0).round() / 100.0
}
