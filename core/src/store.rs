use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::build::parse_postings_u32;
use crate::error::{IndexError, Result};
use crate::DocId;

/// Disk layout and shard naming for a built index: `index_<a..z>.csv`,
/// `index.csv` for non-alphabetic terms, `idToUrl.csv`, and
/// `important_words.txt`, all rooted at one directory.
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn id_to_url_path(&self) -> PathBuf {
        self.root.join("idToUrl.csv")
    }

    pub fn important_words_path(&self) -> PathBuf {
        self.root.join("important_words.txt")
    }

    fn shard_char(term: &str) -> Option<char> {
        term.chars().next().and_then(|c| {
            let lower = c.to_ascii_lowercase();
            if lower.is_ascii_alphabetic() {
                Some(lower)
            } else {
                None
            }
        })
    }

    pub fn shard_path_for_term(&self, term: &str) -> PathBuf {
        match Self::shard_char(term) {
            Some(c) => self.root.join(format!("index_{c}.csv")),
            None => self.root.join("index.csv"),
        }
    }

    /// Persist the id→url mapping, inverting the url→id map IndexBuilder
    /// produced (each url was inserted exactly once, at first sight).
    pub fn save_id_to_url(&self, url_to_id: &HashMap<String, DocId>) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let mut by_id: Vec<(DocId, &String)> = url_to_id.iter().map(|(u, id)| (*id, u)).collect();
        by_id.sort_by_key(|(id, _)| *id);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(File::create(self.id_to_url_path())?));
        writer.write_record(["id", "url"])?;
        for (id, url) in by_id {
            writer.write_record([id.to_string(), url.clone()])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load_id_to_url(&self) -> Result<HashMap<DocId, String>> {
        let path = self.id_to_url_path();
        if !path.exists() {
            return Err(IndexError::IndexMissing { path });
        }
        let mut reader = csv::Reader::from_path(&path)?;
        let mut map = HashMap::new();
        for rec in reader.records() {
            let rec = rec?;
            let id: DocId = rec.get(0).unwrap_or_default().parse().unwrap_or(0);
            let url = rec.get(1).unwrap_or_default().to_string();
            map.insert(id, url);
        }
        Ok(map)
    }

    pub fn save_important_words(&self, words: &HashSet<String>) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let mut sorted: Vec<&String> = words.iter().collect();
        sorted.sort();
        let mut writer = BufWriter::new(File::create(self.important_words_path())?);
        for word in sorted {
            writeln!(writer, "{word}")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load_important_words(&self) -> Result<HashSet<String>> {
        let path = self.important_words_path();
        if !path.exists() {
            return Err(IndexError::IndexMissing { path });
        }
        let file = File::open(&path)?;
        let mut set = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                set.insert(trimmed.to_string());
            }
        }
        Ok(set)
    }

    /// Linear-scan the shard implied by `term`'s first character for a
    /// matching token row. A missing shard file means no term ever routed
    /// there (`ShardMissing`, spec §7): logged, then treated as an empty
    /// result rather than an abort.
    pub fn lookup_posting_list(&self, term: &str) -> Result<Vec<(DocId, f64)>> {
        let path = self.shard_path_for_term(term);
        if !path.exists() {
            let shard = Self::shard_char(term).unwrap_or('_');
            warn!(error = %IndexError::ShardMissing { shard }, term, "shard missing for query term");
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&path)?;
        for rec in reader.records() {
            let rec = rec?;
            if rec.get(0) == Some(term) {
                return Ok(parse_postings_f64(rec.get(1).unwrap_or_default()));
            }
        }
        Ok(Vec::new())
    }

    /// Total on-disk size, in bytes, of every artifact under this store's
    /// root (shards, idToUrl.csv, important_words.txt). Used by the `build`
    /// CLI's summary line.
    pub fn total_disk_size_bytes(&self) -> Result<u64> {
        let mut total = 0u64;
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                total += entry.metadata()?.len();
            }
        }
        Ok(total)
    }
}

/// Like `parse_postings_u32` but for the float TF-IDF scores a final shard
/// stores, parsed to a tagged `(u32, f64)` once at load rather than
/// re-parsing the CSV cell on every access.
fn parse_postings_f64(field: &str) -> Vec<(DocId, f64)> {
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

    #[test]
    fn id_to_url_round_trips() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        let mut map = HashMap::new();
        map.insert("http://b".to_string(), 1u32);
        map.insert("http://a".to_string(), 0u32);
        store.save_id_to_url(&map).unwrap();

        let loaded = store.load_id_to_url().unwrap();
        assert_eq!(loaded.get(&0), Some(&"http://a".to_string()));
        assert_eq!(loaded.get(&1), Some(&"http://b".to_string()));
    }

    #[test]
    fn missing_id_to_url_is_index_missing() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        let err = store.load_id_to_url().unwrap_err();
        assert!(matches!(err, IndexError::IndexMissing { .. }));
    }

    #[test]
    fn missing_important_words_is_index_missing() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        let err = store.load_important_words().unwrap_err();
        assert!(matches!(err, IndexError::IndexMissing { .. }));
    }

    #[test]
    fn important_words_round_trip_sorted() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        let mut words = HashSet::new();
        words.insert("zeta".to_string());
        words.insert("appl".to_string());
        store.save_important_words(&words).unwrap();

        let contents = std::fs::read_to_string(store.important_words_path()).unwrap();
        assert_eq!(contents, "appl\nzeta\n");

        let loaded = store.load_important_words().unwrap();
        assert_eq!(loaded, words);
    }

    #[test]
    fn shard_routing_matches_leading_character() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        assert_eq!(store.shard_path_for_term("appl"), dir.path().join("index_a.csv"));
        assert_eq!(store.shard_path_for_term("Appl"), dir.path().join("index_a.csv"));
        assert_eq!(store.shard_path_for_term("123abc"), dir.path().join("index.csv"));
    }

    #[test]
    fn lookup_returns_empty_for_missing_shard_file() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        let result = store.lookup_posting_list("zzz").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn lookup_finds_matching_row_and_parses_postings() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        let mut f = File::create(store.shard_path_for_term("appl")).unwrap();
        writeln!(f, "token,postings").unwrap();
        writeln!(f, "appl,\"0:0.39, 2:1.5\"").unwrap();

        let postings = store.lookup_posting_list("appl").unwrap();
        assert_eq!(postings, vec![(0, 0.39), (2, 1.5)]);
    }
}
