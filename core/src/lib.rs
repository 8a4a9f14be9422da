pub mod build;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod error;
pub mod html;
pub mod merge;
pub mod process;
pub mod query;
pub mod store;
pub mod tokenizer;

pub type DocId = u32;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::info;

use crate::build::IndexBuilder;
use crate::cache::Cache;
use crate::config::{BuildConfig, QueryConfig};
use crate::corpus::DocReader;
use crate::error::Result;
use crate::query::QueryEvaluator;
use crate::store::IndexStore;

/// Summary returned by `build_corpus`, the numbers the `build` CLI prints
/// per spec §6: files processed, unique tokens, total disk size.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub files_processed: usize,
    pub docs_indexed: u32,
    pub unique_tokens: usize,
    pub total_disk_size_bytes: u64,
}

/// Run the whole indexing pipeline: DocReader → DocProcessor (inside
/// IndexBuilder) → partial flushes → Merger → IndexStore artifacts. This is
/// the single entry point the `indexer` binary calls.
pub fn build_corpus<P: AsRef<Path>>(corpus_root: P, out_dir: P, config: BuildConfig) -> Result<BuildSummary> {
    let reader = DocReader::open(&corpus_root);
    let mut builder = IndexBuilder::new(&out_dir, config);
    builder.build_from_reader(reader)?;
    let output = builder.finish()?;

    info!(num_docs = output.num_docs, partials = output.partial_paths.len(), "starting merge");
    let merge_stats = merge::merge_partials(&output.partial_paths, output.num_docs, out_dir.as_ref())?;

    let store = IndexStore::new(&out_dir);
    store.save_id_to_url(&output.url_to_id)?;
    store.save_important_words(&output.important_words)?;

    let total_disk_size_bytes = store.total_disk_size_bytes()?;

    Ok(BuildSummary {
        files_processed: output.files_processed,
        docs_indexed: output.num_docs,
        unique_tokens: merge_stats.unique_terms,
        total_disk_size_bytes,
    })
}

/// Everything the `search` CLI needs loaded once at startup to answer many
/// queries cheaply.
pub struct SearchSession {
    pub store: IndexStore,
    pub important_words: HashSet<String>,
    pub id_to_url: HashMap<DocId, String>,
    pub query_config: QueryConfig,
}

impl SearchSession {
    pub fn open<P: AsRef<Path>>(index_dir: P, query_config: QueryConfig) -> Result<Self> {
        let store = IndexStore::new(&index_dir);
        let id_to_url = store.load_id_to_url()?;
        let important_words = store.load_important_words()?;
        Ok(Self { store, important_words, id_to_url, query_config })
    }

    pub fn evaluate(&self, query: &str) -> Result<Vec<String>> {
        let mut cache = Cache::new(&self.store, self.query_config.cache_capacity);
        let evaluator = QueryEvaluator::new(&self.important_words, &self.id_to_url);
        evaluator.evaluate(query, &mut cache)
    }
}
