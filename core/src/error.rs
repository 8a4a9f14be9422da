use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

/// Where a record-level skip originated, for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Json,
    Html,
    Encoding,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceKind::Json => "json",
            SourceKind::Html => "html",
            SourceKind::Encoding => "encoding",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("record skipped ({source}): {reason}")]
    RecordSkip { source: SourceKind, reason: String },

    #[error("shard missing for leading char {shard:?}")]
    ShardMissing { shard: char },

    #[error("no index found at {path}")]
    IndexMissing { path: PathBuf },

    #[error("merge invariant violated for term {term:?}: {detail}")]
    MergeInvariantViolation { term: String, detail: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
