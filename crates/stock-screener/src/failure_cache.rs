//! Durable set of symbols known to fail analysis.
//!
//! On disk: UTF-8, one symbol per line, sorted ascending, newline after
//! every entry. A missing file is an empty set.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::ScreenError;
use crate::fs_util::write_atomically;

pub struct FailureCache {
    path: PathBuf,
    known: BTreeSet<String>,
}

impl FailureCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            known: BTreeSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the backing file, replacing the in-memory set.
    ///
    /// Blank lines and surrounding whitespace are ignored. Calling this
    /// repeatedly has no side effects.
    pub fn load(&mut self) -> Result<&BTreeSet<String>, ScreenError> {
        self.known = match std::fs::read_to_string(&self.path) {
            Ok(text) => parse_symbols(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(source) => {
                return Err(ScreenError::FailureCache {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(&self.known)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.known.contains(symbol)
    }

    /// Merge `symbols` into the set and rewrite the whole file.
    ///
    /// Nothing is written when `symbols` is empty. Returns how many
    /// symbols were not already known.
    pub fn record<I>(&mut self, symbols: I) -> Result<usize, ScreenError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen_any = false;
        let mut added = 0;
        for symbol in symbols {
            seen_any = true;
            if self.known.insert(symbol) {
                added += 1;
            }
        }

        if !seen_any {
            return Ok(0);
        }

        write_atomically(&self.path, render_symbols(&self.known).as_bytes()).map_err(|source| {
            ScreenError::FailureCache {
                path: self.path.clone(),
                source,
            }
        })?;

        tracing::debug!(
            "Failure cache {} now holds {} symbols ({} new)",
            self.path.display(),
            self.known.len(),
            added
        );
        Ok(added)
    }
}

fn parse_symbols(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn render_symbols(symbols: &BTreeSet<String>) -> String {
    symbols.iter().map(|s| format!("{}\n", s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> FailureCache {
        FailureCache::new(dir.path().join("bad_tickers.txt"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);
        assert!(cache.load().unwrap().is_empty());
        assert!(!cache.path().exists());
    }

    #[test]
    fn test_load_strips_whitespace_and_blanks() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);
        std::fs::write(cache.path(), "  ZZZ \n\n\tAAA\n   \nMMM").unwrap();

        let loaded: Vec<_> = cache.load().unwrap().iter().cloned().collect();
        assert_eq!(loaded, vec!["AAA", "MMM", "ZZZ"]);
        assert!(cache.contains("MMM"));
        assert!(!cache.contains("mmm"));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);
        std::fs::write(cache.path(), "BBB\nAAA\n").unwrap();

        let first = cache.load().unwrap().clone();
        let second = cache.load().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(cache.path()).unwrap(), "BBB\nAAA\n");
    }

    #[test]
    fn test_record_merges_and_sorts_on_disk() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);
        std::fs::write(cache.path(), "QQQ\nAAA\n").unwrap();
        cache.load().unwrap();

        let added = cache
            .record(vec!["XYZ".to_string(), "AAA".to_string(), "BBB".to_string()])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(
            std::fs::read_to_string(cache.path()).unwrap(),
            "AAA\nBBB\nQQQ\nXYZ\n"
        );

        let mut reloaded = cache_in(&dir);
        let symbols = reloaded.load().unwrap();
        assert!(symbols.contains("XYZ"));
        assert_eq!(symbols.len(), 4);
    }

    #[test]
    fn test_record_nothing_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);
        std::fs::write(cache.path(), "b\n a\n").unwrap();
        cache.load().unwrap();

        assert_eq!(cache.record(Vec::new()).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(cache.path()).unwrap(), "b\n a\n");
    }

    #[test]
    fn test_record_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);
        cache.load().unwrap();
        cache.record(vec!["BBB".to_string()]).unwrap();
        assert_eq!(std::fs::read_to_string(cache.path()).unwrap(), "BBB\n");
    }
}
