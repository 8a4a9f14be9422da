use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::error::Result;
use crate::store::IndexStore;
use crate::DocId;

pub type PostingList = Vec<(DocId, f64)>;

/// Bounded term -> posting-list cache, backed by `IndexStore` on a miss.
/// Created fresh per query session (spec §5: "Cache reads and writes are not
/// shared across threads"). Negative lookups (term not found anywhere) are
/// never cached, since a later build could add the term and a stale empty
/// entry would then shadow real results forever.
pub struct Cache<'a> {
    store: &'a IndexStore,
    lru: LruCache<String, PostingList>,
}

impl<'a> Cache<'a> {
    pub fn new(store: &'a IndexStore, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to at least 1");
        Self { store, lru: LruCache::new(capacity) }
    }

    pub fn retrieve(&mut self, term: &str) -> Result<PostingList> {
        if let Some(hit) = self.lru.get(term) {
            debug!(term, "cache hit");
            return Ok(hit.clone());
        }
        debug!(term, "cache miss");
        let postings = self.store.lookup_posting_list(term)?;
        if !postings.is_empty() {
            self.lru.put(term.to_string(), postings.clone());
        }
        Ok(postings)
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn store_with_terms(dir: &std::path::Path, terms: &[&str]) -> IndexStore {
        let store = IndexStore::new(dir);
        let mut f = File::create(store.shard_path_for_term("t")).unwrap();
        writeln!(f, "token,postings").unwrap();
        for (i, term) in terms.iter().enumerate() {
            writeln!(f, "{term},\"{i}:1.0\"").unwrap();
        }
        store
    }

    #[test]
    fn bounded_cache_evicts_least_recently_used() {
        let dir = tempdir().unwrap();
        let store = store_with_terms(dir.path(), &["t1", "t2", "t3"]);
        let mut cache = Cache::new(&store, 2);

        cache.retrieve("t1").unwrap();
        cache.retrieve("t2").unwrap();
        cache.retrieve("t3").unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.lru.peek("t1").is_none());
        assert!(cache.lru.peek("t2").is_some());
        assert!(cache.lru.peek("t3").is_some());
    }

    #[test]
    fn misses_on_nonexistent_term_are_not_cached() {
        let dir = tempdir().unwrap();
        let store = store_with_terms(dir.path(), &["t1"]);
        let mut cache = Cache::new(&store, 10);

        let result = cache.retrieve("ghost").unwrap();
        assert!(result.is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn hit_returns_identical_posting_list() {
        let dir = tempdir().unwrap();
        let store = store_with_terms(dir.path(), &["t1"]);
        let mut cache = Cache::new(&store, 10);

        let first = cache.retrieve("t1").unwrap();
        let second = cache.retrieve("t1").unwrap();
        assert_eq!(first, second);
    }
}
