use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::BuildConfig;
use crate::corpus::DocReader;
use crate::error::{IndexError, Result};
use crate::process::{process_document, ProcessResult, ScoreMap};
use crate::DocId;

/// Fixed per-posting overhead used by the explicit byte-accounting flush
/// trigger (spec §9: "use an explicit byte accounting... to make the bound
/// portable" rather than reflecting on the real in-memory dict size).
const POSTING_OVERHEAD_BYTES: usize = 16;

/// Accumulates an in-memory inverted index (term -> unordered postings) and
/// flushes it to a sorted partial index file once its estimated size crosses
/// `BuildConfig::flush_threshold_bytes`. Owns every piece of mutable state
/// the build needs: the doc-id counter, the URL↔id map, and the
/// ImportantWordSet (spec §9: these live in one component, not module
/// scope).
pub struct IndexBuilder {
    out_dir: PathBuf,
    config: BuildConfig,
    accumulator: HashMap<String, Vec<(DocId, u32)>>,
    accumulator_bytes: usize,
    next_doc_id: DocId,
    url_to_id: HashMap<String, DocId>,
    important_words: HashSet<String>,
    partial_paths: Vec<PathBuf>,
    next_partial: u32,
    files_processed: usize,
    docs_indexed: usize,
}

pub struct BuildOutput {
    pub partial_paths: Vec<PathBuf>,
    pub num_docs: u32,
    pub url_to_id: HashMap<String, DocId>,
    pub important_words: HashSet<String>,
    pub files_processed: usize,
}

impl IndexBuilder {
    pub fn new<P: AsRef<Path>>(out_dir: P, config: BuildConfig) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            config,
            accumulator: HashMap::new(),
            accumulator_bytes: 0,
            next_doc_id: 0,
            url_to_id: HashMap::new(),
            important_words: HashSet::new(),
            partial_paths: Vec::new(),
            next_partial: 0,
            files_processed: 0,
            docs_indexed: 0,
        }
    }

    /// Drive a DocReader over the whole corpus, processing each record and
    /// flushing partial indices as the accumulator fills.
    pub fn build_from_reader(&mut self, mut reader: DocReader) -> Result<()> {
        while let Some(item) = reader.next() {
            match item {
                Ok(raw) => self.ingest(raw)?,
                Err(IndexError::RecordSkip { source, reason }) => {
                    warn!(%source, %reason, "skipping malformed record");
                }
                Err(e) => return Err(e),
            }
        }
        // Only known once the walk is fully exhausted.
        self.files_processed = reader.files_seen();
        Ok(())
    }

    fn ingest(&mut self, raw: crate::corpus::RawDoc) -> Result<()> {
        let tags = self.config.important_tags.clone();
        match process_document(raw, &mut self.next_doc_id, &mut self.url_to_id, &mut self.important_words, &tags) {
            ProcessResult::Indexed(outcome) => {
                self.docs_indexed += 1;
                self.accumulate(outcome.doc_id, outcome.scores);
                if self.accumulator_bytes >= self.config.flush_threshold_bytes {
                    self.flush()?;
                }
            }
            ProcessResult::Duplicate => {}
        }
        Ok(())
    }

    fn accumulate(&mut self, doc_id: DocId, scores: ScoreMap) {
        for (term, score) in scores {
            let is_new_term = !self.accumulator.contains_key(&term);
            if is_new_term {
                self.accumulator_bytes += term.len();
            }
            self.accumulator.entry(term).or_default().push((doc_id, score));
            self.accumulator_bytes += POSTING_OVERHEAD_BYTES;
        }
    }

    /// Sort the accumulator by term and write it to `partial_index_N.csv`,
    /// then clear it. A no-op when the accumulator is empty.
    pub fn flush(&mut self) -> Result<()> {
        if self.accumulator.is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("partial_index_{}.csv", self.next_partial));
        self.next_partial += 1;

        let mut terms: Vec<&String> = self.accumulator.keys().collect();
        terms.sort();

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(BufWriter::new(File::create(&path)?));
        for term in &terms {
            let postings = &self.accumulator[*term];
            let rendered = render_postings(postings);
            writer.write_record([term.as_str(), rendered.as_str()])?;
        }
        writer.flush()?;

        info!(path = %path.display(), terms = terms.len(), bytes = self.accumulator_bytes, "flushed partial index");

        self.partial_paths.push(path);
        self.accumulator.clear();
        self.accumulator_bytes = 0;
        Ok(())
    }

    /// Finish the build: flush any remaining accumulator contents and hand
    /// back everything the Merger and IndexStore need.
    pub fn finish(mut self) -> Result<BuildOutput> {
        self.flush()?;
        Ok(BuildOutput {
            partial_paths: self.partial_paths,
            num_docs: self.next_doc_id,
            url_to_id: self.url_to_id,
            important_words: self.important_words,
            files_processed: self.files_processed,
        })
    }
}

fn render_postings(postings: &[(DocId, u32)]) -> String {
    postings.iter().map(|(doc_id, score)| format!("{doc_id}:{score}")).collect::<Vec<_>>().join(", ")
}

/// Parse a rendered postings cell like `"3:12, 7:4"` into `(doc_id, score)`
/// pairs, tagging the dynamic CSV text once at load time instead of
/// re-parsing it on every access (spec §9).
pub fn parse_postings_u32(field: &str) -> Vec<(DocId, u32)> {
    field
        .split(',')
        .filter_map(|tok| {
            let tok = tok.trim();
            if tok.is_empty() {
                return None;
            }
            let (doc, score) = tok.split_once(':')?;
            Some((doc.parse().ok()?, score.parse().ok()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::tempdir;

    fn write_corpus(dir: &Path, name: &str, lines: &[&str]) {
        let mut f = File::create(dir.join(name)).unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
    }

    #[test]
    fn flush_boundary_emits_one_partial_per_forced_flush() {
        let corpus_dir = tempdir().unwrap();
        write_corpus(
            corpus_dir.path(),
            "docs.jsonl",
            &[
                r#"{"url":"http://a","content":"<p>apple</p>"}"#,
                r#"{"url":"http://b","content":"<p>banana</p>"}"#,
                r#"{"url":"http://c","content":"<p>cherry</p>"}"#,
            ],
        );
        let out_dir = tempdir().unwrap();
        // Force a flush after every document.
        let config = BuildConfig { flush_threshold_bytes: 1, ..BuildConfig::default() };
        let mut builder = IndexBuilder::new(out_dir.path(), config);
        builder.build_from_reader(DocReader::open(corpus_dir.path())).unwrap();
        let output = builder.finish().unwrap();

        assert_eq!(output.partial_paths.len(), 3);
        assert_eq!(output.num_docs, 3);
    }

    #[test]
    fn terms_within_a_partial_are_sorted() {
        let corpus_dir = tempdir().unwrap();
        write_corpus(
            corpus_dir.path(),
            "docs.jsonl",
            &[r#"{"url":"http://a","content":"<p>zebra apple mango</p>"}"#],
        );
        let out_dir = tempdir().unwrap();
        let mut builder = IndexBuilder::new(out_dir.path(), BuildConfig::default());
        builder.build_from_reader(DocReader::open(corpus_dir.path())).unwrap();
        let output = builder.finish().unwrap();
        assert_eq!(output.partial_paths.len(), 1);

        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(&output.partial_paths[0]).unwrap();
        let mut terms: Vec<String> = Vec::new();
        for rec in reader.records() {
            terms.push(rec.unwrap()[0].to_string());
        }
        let mut sorted = terms.clone();
        sorted.sort();
        assert_eq!(terms, sorted);
    }

    #[test]
    fn parse_postings_round_trips_render_postings() {
        let postings = vec![(0u32, 100u32), (3, 7)];
        let rendered = render_postings(&postings);
        assert_eq!(rendered, "0:100, 3:7");
        assert_eq!(parse_postings_u32(&rendered), postings);
    }
}
