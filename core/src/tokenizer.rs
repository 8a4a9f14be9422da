use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^A-Za-z0-9\s]").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Tokenize text: lowercase, replace every byte outside `[A-Za-z0-9\s]` with a
/// space, split on whitespace, Porter-stem each resulting word. Both the
/// writer (DocProcessor) and the reader (QueryEvaluator) call this function so
/// that terms produced at index time and query time agree exactly.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_ALNUM.replace_all(&lowered, " ");
    cleaned
        .split_whitespace()
        .map(|w| STEMMER.stem(w).to_string())
        .collect()
}
