//! Process-wide model state.
//!
//! Readers take an `Arc` snapshot and keep it for the whole request; a reload
//! builds the new snapshot off-lock and swaps it in, so in-flight work never
//! sees a half-loaded model.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use crate::{
    corpus::{self, CorpusStats},
    error::CorpusLoadError,
    quark::{StringTable, TagSet},
};

/// Corpus statistics plus the tag vocabulary derived from them.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub stats: CorpusStats,
    pub vocab: TagSet,
}

impl From<CorpusStats> for Snapshot {
    fn from(stats: CorpusStats) -> Self {
        let vocab = stats.tag_set();
        Self { stats, vocab }
    }
}

#[derive(Debug)]
pub struct ModelState {
    corpus_path: PathBuf,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl ModelState {
    /// A state with nothing loaded yet.
    pub fn empty<P: Into<PathBuf>>(corpus_path: P) -> Self {
        Self { corpus_path: corpus_path.into(), current: RwLock::new(None) }
    }

    /// Load `corpus_path` now. A failed load is logged and leaves the state empty.
    pub fn open<P: Into<PathBuf>>(corpus_path: P) -> Self {
        let state = Self::empty(corpus_path);
        if let Err(e) = state.reload() {
            log::error!("failed to initialize corpus: {e}");
        }
        state
    }

    pub fn with_stats<P: Into<PathBuf>>(corpus_path: P, stats: CorpusStats) -> Self {
        let state = Self::empty(corpus_path);
        state.replace(Snapshot::from(stats));
        state
    }

    pub fn corpus_path(&self) -> &Path {
        &self.corpus_path
    }

    /// Current snapshot, if a corpus has been loaded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_some_and(|s| !s.vocab.is_empty())
    }

    /// Re-read the corpus file. On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<Snapshot>, CorpusLoadError> {
        let stats = corpus::load(&self.corpus_path)?;
        let snapshot = self.replace(Snapshot::from(stats));
        log::info!("corpus loaded successfully ({} tags)", snapshot.vocab.len());
        Ok(snapshot)
    }

    fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&snapshot));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn corpus_file(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{body}").unwrap();
        f
    }

    #[test]
    fn open_missing_is_not_ready() {
        let state = ModelState::open("no/such/corpus.json");
        assert!(state.snapshot().is_none());
        assert!(!state.is_ready());
    }

    #[test]
    fn reload_swaps_snapshot() {
        let f = corpus_file(r#"[[["the", "DT"], ["dog", "NN"]]]"#);
        let state = ModelState::open(f.path());
        let before = state.snapshot().unwrap();
        assert_eq!(before.stats.total_words, 2);

        std::fs::write(f.path(), r#"[[["the", "DT"], ["dog", "NN"], ["barks", "VBZ"]]]"#).unwrap();
        state.reload().unwrap();
        let after = state.snapshot().unwrap();
        assert_eq!(after.stats.total_words, 3);
        /* the old snapshot is untouched for whoever still holds it */
        assert_eq!(before.stats.total_words, 2);
        assert_eq!(after.vocab.len(), 3);
    }

    #[test]
    fn failed_reload_keeps_previous() {
        let f = corpus_file(r#"[[["the", "DT"], ["dog", "NN"]]]"#);
        let state = ModelState::open(f.path());
        std::fs::write(f.path(), "not json").unwrap();
        let err = state.reload().unwrap_err();
        assert!(matches!(err, CorpusLoadError::MalformedData { .. }));
        assert_eq!(state.snapshot().unwrap().stats.total_words, 2);
        assert!(state.is_ready());
    }
}
