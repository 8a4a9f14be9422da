use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::{IndexError, SourceKind};

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    url: String,
    content: String,
}

/// A single ingested record before de-duplication: the raw URL and raw HTML.
#[derive(Debug, Clone)]
pub struct RawDoc {
    pub url: String,
    pub html: String,
}

/// Streams `{"url": ..., "content": ...}` records out of every file found
/// under a corpus root, one line at a time. No file is ever loaded whole:
/// each call to `next` reads exactly one more line from the current file.
/// Malformed JSON lines surface as `IndexError::RecordSkip` rather than
/// aborting the walk.
pub struct DocReader {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<BufReader<File>>,
    files_seen: usize,
}

impl DocReader {
    pub fn open<P: AsRef<Path>>(root: P) -> Self {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        Self { files: files.into_iter(), current: None, files_seen: 0 }
    }

    /// Number of distinct files the reader has opened so far.
    pub fn files_seen(&self) -> usize {
        self.files_seen
    }

    fn advance_file(&mut self) -> bool {
        match self.files.next() {
            Some(path) => {
                match File::open(&path) {
                    Ok(f) => {
                        self.current = Some(BufReader::new(f));
                        self.files_seen += 1;
                        true
                    }
                    Err(_) => self.advance_file(),
                }
            }
            None => false,
        }
    }
}

impl Iterator for DocReader {
    type Item = Result<RawDoc, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() && !self.advance_file() {
                return None;
            }
            let reader = self.current.as_mut().expect("just ensured a reader");
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => {
                    self.current = None;
                    continue;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(parse_record(trimmed));
                }
                Err(e) => {
                    self.current = None;
                    return Some(Err(IndexError::RecordSkip {
                        source: SourceKind::Encoding,
                        reason: e.to_string(),
                    }));
                }
            }
        }
    }
}

fn parse_record(line: &str) -> Result<RawDoc, IndexError> {
    let record: CorpusRecord = serde_json::from_str(line).map_err(|e| IndexError::RecordSkip {
        source: SourceKind::Json,
        reason: e.to_string(),
    })?;
    Ok(RawDoc { url: record.url, html: record.content })
}

/// Strip a `#fragment` from a URL so that `http://a#x` and `http://a#y`
/// canonicalize to the same string. Pure string surgery: no full URL parser
/// is needed because the spec only asks for fragment removal, and an
/// unparsable "URL" (the corpus makes no format guarantee beyond this field
/// being a string) must still canonicalize deterministically.
pub fn canonicalize_url(url: &str) -> String {
    match url.find('#') {
        Some(idx) => url[..idx].to_string(),
        None => url.to_string(),
    }
}
