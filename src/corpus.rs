use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use crate::{error::CorpusLoadError, quark::TagSet};

/// Reserved transition source for the first tag of every sentence.
pub const START_TAG: &str = "<START>";

/// A `(word, tag)` record. Deserializes from a 2-element JSON array.
pub type TaggedWord = (String, String);
pub type Sentence = Vec<TaggedWord>;
pub type TaggedCorpus = Vec<Sentence>;

/// Aggregate frequency counts over a tagged corpus.
///
/// Built once at load time and read-only afterwards; share it behind an `Arc`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CorpusStats {
    pub tag_count: HashMap<String, usize>,
    /// Keyed by `(lowercased word, tag)`.
    pub word_tag_count: HashMap<(String, String), usize>,
    /// Keyed by `(previous tag, current tag)`; the source may be [`START_TAG`].
    pub tag_transition_count: HashMap<(String, String), usize>,
    pub total_words: usize,
    /// Tags in first-seen order, so the derived vocabulary iterates reproducibly.
    tags: Vec<String>,
}

impl CorpusStats {
    pub fn from_corpus(corpus: &[Sentence]) -> Self {
        let mut stats = Self::default();
        for sentence in corpus {
            stats.add_sentence(sentence);
        }
        stats
    }

    fn add_sentence(&mut self, sentence: &[TaggedWord]) {
        let mut prev_tag = START_TAG;
        for (word, tag) in sentence {
            match self.tag_count.get_mut(tag) {
                Some(n) => *n += 1,
                None => {
                    self.tag_count.insert(tag.clone(), 1);
                    self.tags.push(tag.clone());
                }
            }
            *self.word_tag_count.entry((word.to_lowercase(), tag.clone())).or_default() += 1;
            *self.tag_transition_count.entry((prev_tag.to_string(), tag.clone())).or_default() += 1;
            self.total_words += 1;
            prev_tag = tag;
        }
    }

    /// Occurrence count of `tag`, zero when unseen.
    pub fn tag_count(&self, tag: &str) -> usize {
        self.tag_count.get(tag).copied().unwrap_or_default()
    }

    pub fn word_tag_count(&self, word: &str, tag: &str) -> Option<usize> {
        self.word_tag_count.get(&(word.to_lowercase(), tag.to_string())).copied()
    }

    pub fn transition_count(&self, prev: &str, curr: &str) -> Option<usize> {
        self.tag_transition_count.get(&(prev.to_string(), curr.to_string())).copied()
    }

    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    /// Number of non-empty sentences, i.e. transitions out of [`START_TAG`].
    pub fn num_sentences(&self) -> usize {
        self.tag_transition_count.iter().filter(|((prev, _), _)| prev == START_TAG).map(|(_, n)| *n).sum()
    }

    /// Tags in the order they were first seen in the corpus.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// The tag vocabulary: key set of `tag_count`, in first-seen order.
    pub fn tag_set(&self) -> TagSet {
        self.tags().collect()
    }

    /// Most frequent tag among `candidates`; the first one wins ties.
    pub fn most_frequent_tag<'a, I>(&self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<(&str, usize)> = None;
        for tag in candidates {
            let n = self.tag_count(tag);
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((tag, n));
            }
        }
        best.map(|(tag, _)| tag)
    }
}

impl From<&TaggedCorpus> for CorpusStats {
    fn from(corpus: &TaggedCorpus) -> Self {
        Self::from_corpus(corpus)
    }
}

/// Parse a JSON corpus (array of sentences of `[word, tag]` pairs).
pub fn parse<R: Read>(reader: R) -> Result<TaggedCorpus, serde_json::Error> {
    serde_json::from_reader(reader)
}

pub fn parse_str(s: &str) -> Result<TaggedCorpus, serde_json::Error> {
    serde_json::from_str(s)
}

/// Read the raw sentences of a corpus file.
pub fn read_corpus<P: AsRef<Path>>(path: P) -> Result<TaggedCorpus, CorpusLoadError> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| CorpusLoadError::from_io(path.to_path_buf(), e))?;
    parse(BufReader::new(f)).map_err(|e| CorpusLoadError::from_json(PathBuf::from(path), e))
}

/// Load a corpus file and aggregate its counts.
pub fn load<P: AsRef<Path>>(path: P) -> Result<CorpusStats, CorpusLoadError> {
    let path = path.as_ref();
    let corpus = read_corpus(path).map_err(|e| {
        log::error!("{e}");
        e
    })?;
    let stats = CorpusStats::from_corpus(&corpus);
    log::info!(
        "loaded corpus {}: {} sentences, {} tokens, {} tags",
        path.display(),
        corpus.len(),
        stats.total_words,
        stats.num_tags()
    );
    Ok(stats)
}
