//! Part-of-speech tagging with a bigram hidden Markov model.
//!
//! Counts are aggregated from a JSON corpus of tagged sentences
//! ([`corpus::load`]), turned into log-probabilities on demand
//! ([`hmm::ProbabilityModel`]) and decoded with Viterbi
//! ([`hmm::ViterbiTagger`]). [`evaluation`] measures accuracy on labeled
//! data and [`speaking`] scores free-text answers using the tagger.

pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod hmm;
pub mod quark;
pub mod speaking;
pub mod state;

pub use corpus::{CorpusStats, Sentence, TaggedCorpus};
pub use error::{CorpusLoadError, DecodeError, Error, Result, ScoreError};
pub use evaluation::{evaluate, evaluate_report, Evaluation};
pub use hmm::{decode, Decoded, Tagger, ViterbiTagger};
pub use quark::{StringTable, TagSet};
pub use state::{ModelState, Snapshot};
