//! First-order hidden Markov model tagger.

mod context;
pub mod probability;
pub mod tagger;

pub use probability::ProbabilityModel;
pub use tagger::{Decoded, Tagger, ViterbiTagger};

use crate::{corpus::CorpusStats, quark::TagSet};

/// Decode `tokens` with a fresh tagger. Returns one tag per token.
pub fn decode<S: AsRef<str>>(tokens: &[S], vocab: &TagSet, stats: &CorpusStats) -> Vec<String> {
    ViterbiTagger::new(stats).tag(tokens, vocab)
}
