use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::corpus::{canonicalize_url, RawDoc};
use crate::html::extract;
use crate::tokenizer::tokenize;
use crate::DocId;

/// Per-document term -> raw score contribution emitted by `process_document`.
/// Score is `freq` unless the term is in the (ever-growing) important-word
/// set, in which case it is `freq * 100` (spec §4.2).
pub type ScoreMap = HashMap<String, u32>;

pub struct ProcessOutcome {
    pub doc_id: DocId,
    pub scores: ScoreMap,
}

pub enum ProcessResult {
    Indexed(ProcessOutcome),
    /// Canonical URL already seen; no doc-id was allocated.
    Duplicate,
}

/// Consume one (url, html) pair and fold it into the shared accumulator
/// state IndexBuilder owns: the doc-id counter, the URL↔id map, and the
/// important-word set. Returns the per-document term scores for IndexBuilder
/// to merge into its in-memory inverted index.
///
/// The important-word set keeps growing across the whole build (spec §9
/// Open Question (c)): a term discovered as "important" only after this
/// document was processed will not retroactively boost this document's
/// already-emitted scores. That is the historical behavior this spec
/// preserves, not an oversight here.
pub fn process_document(
    raw: RawDoc,
    next_doc_id: &mut DocId,
    url_to_id: &mut HashMap<String, DocId>,
    important_words: &mut HashSet<String>,
    important_tags: &[String],
) -> ProcessResult {
    let canonical = canonicalize_url(&raw.url);
    if url_to_id.contains_key(&canonical) {
        return ProcessResult::Duplicate;
    }

    let extracted = extract(&raw.html, important_tags);

    for term in tokenize(&extracted.important_text) {
        important_words.insert(term);
    }

    let mut freq: HashMap<String, u32> = HashMap::new();
    for term in tokenize(&extracted.all_text) {
        *freq.entry(term).or_insert(0) += 1;
    }

    if freq.is_empty() {
        warn!(url = %raw.url, "document produced no tokens");
    }

    let mut scores = ScoreMap::new();
    for (term, count) in freq {
        let score = if important_words.contains(&term) { count * 100 } else { count };
        scores.insert(term, score);
    }

    let doc_id = *next_doc_id;
    *next_doc_id += 1;
    url_to_id.insert(canonical, doc_id);

    ProcessResult::Indexed(ProcessOutcome { doc_id, scores })
}
