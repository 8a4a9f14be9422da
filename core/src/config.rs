/// Tunables for `IndexBuilder`. Defaults match spec: a 3 MiB working-set
/// flush threshold, with a 1 GiB "large corpus" preset.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Flush the in-memory accumulator once its estimated byte size reaches
    /// this bound.
    pub flush_threshold_bytes: usize,
    /// HTML tags whose text contributes to the important-word set.
    pub important_tags: Vec<String>,
}

pub const DEFAULT_FLUSH_THRESHOLD_BYTES: usize = 3 * 1024 * 1024;
pub const LARGE_CORPUS_FLUSH_THRESHOLD_BYTES: usize = 1024 * 1024 * 1024;

fn default_important_tags() -> Vec<String> {
    ["h1", "h2", "h3", "strong", "b"].iter().map(|s| s.to_string()).collect()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            flush_threshold_bytes: DEFAULT_FLUSH_THRESHOLD_BYTES,
            important_tags: default_important_tags(),
        }
    }
}

impl BuildConfig {
    pub fn large_corpus() -> Self {
        Self {
            flush_threshold_bytes: LARGE_CORPUS_FLUSH_THRESHOLD_BYTES,
            important_tags: default_important_tags(),
        }
    }
}

/// Tunables for `QueryEvaluator` / `Cache`.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Maximum number of posting lists the Cache holds at once.
    pub cache_capacity: usize,
}

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

impl Default for QueryConfig {
    fn default() -> Self {
        Self { cache_capacity: DEFAULT_CACHE_CAPACITY }
    }
}
