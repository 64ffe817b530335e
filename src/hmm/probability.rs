//! Log-probabilities derived from corpus counts.
//!
//! Unseen events get a pseudo-count of one instead of proper smoothing:
//! `ln((count or 1) / (total or 1))` for transitions, and a fixed penalty of
//! `ln(1e-6)` for any `(word, tag)` pair absent from the corpus.

use std::collections::HashMap;

use crate::corpus::CorpusStats;

/// Probability assigned to a word never observed with a tag.
pub const UNKNOWN_WORD_PROB: f64 = 1e-6;

/// `ln(P(curr | prev))` with the count floor applied to numerator and denominator.
pub fn transition_log_prob(stats: &CorpusStats, prev: &str, curr: &str) -> f64 {
    let count = stats.transition_count(prev, curr).unwrap_or(1);
    let total = stats.tag_count.get(prev).copied().unwrap_or(1);
    (count as f64 / total as f64).ln()
}

/// `ln(P(word | tag))`; case-insensitive in `word`.
pub fn emission_log_prob(stats: &CorpusStats, word: &str, tag: &str) -> f64 {
    match stats.word_tag_count(word, tag) {
        None => UNKNOWN_WORD_PROB.ln(),
        Some(count) => {
            let total = stats.tag_count.get(tag).copied().unwrap_or(1);
            (count as f64 / total as f64).ln()
        }
    }
}

/// `ln(P(tag))` over all tokens, used for the first position of a sentence.
///
/// Infinite when the corpus is empty; the tagger checks for that first.
pub fn initial_log_prob(stats: &CorpusStats, tag: &str) -> f64 {
    let count = stats.tag_count.get(tag).copied().unwrap_or(1);
    (count as f64 / stats.total_words as f64).ln()
}

/// Memoizing view over one [`CorpusStats`] snapshot.
///
/// Emissions are cached per `(lowercased word, tag)`; the cache belongs to a
/// single tagger and is cleared at the start of every decode. Transitions are
/// not cached here: the tagger computes each pair once per decode into its
/// lattice, which serves as the transition memo.
#[derive(Debug)]
pub struct ProbabilityModel<'a> {
    stats: &'a CorpusStats,
    emissions: HashMap<(String, String), f64>,
}

impl<'a> ProbabilityModel<'a> {
    pub fn new(stats: &'a CorpusStats) -> Self {
        Self { stats, emissions: HashMap::new() }
    }

    pub fn stats(&self) -> &'a CorpusStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.emissions.clear();
    }

    /// Number of cached emission entries.
    pub fn cache_len(&self) -> usize {
        self.emissions.len()
    }

    pub fn transition_log_prob(&self, prev: &str, curr: &str) -> f64 {
        transition_log_prob(self.stats, prev, curr)
    }

    pub fn emission_log_prob(&mut self, word: &str, tag: &str) -> f64 {
        let stats = self.stats;
        *self
            .emissions
            .entry((word.to_lowercase(), tag.to_string()))
            .or_insert_with(|| emission_log_prob(stats, word, tag))
    }

    pub fn initial_log_prob(&self, tag: &str) -> f64 {
        initial_log_prob(self.stats, tag)
    }
}
