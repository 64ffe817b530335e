use crate::{
    corpus::CorpusStats,
    error::DecodeError,
    quark::{StringTable, TagSet},
};

use super::{context::HmmContext, probability::ProbabilityModel};

/// Tag used for the fallback path when the statistics contain no tag at all.
pub const UNKNOWN_TAG: &str = "UNK";

/// Outcome of a decode call.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The maximum-likelihood path found by Viterbi.
    Viterbi(Vec<String>),
    /// Decoding failed; every token carries the most frequent tag.
    Fallback { tags: Vec<String>, reason: DecodeError },
}

impl Decoded {
    pub fn tags(&self) -> &[String] {
        match self {
            Self::Viterbi(tags) | Self::Fallback { tags, .. } => tags,
        }
    }

    pub fn into_tags(self) -> Vec<String> {
        match self {
            Self::Viterbi(tags) | Self::Fallback { tags, .. } => tags,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

pub trait Tagger {
    /// Decode `tokens` over `vocab`. Always yields one tag per token.
    fn decode<S: AsRef<str>>(&mut self, tokens: &[S], vocab: &TagSet) -> Decoded;

    fn tag<S: AsRef<str>>(&mut self, tokens: &[S], vocab: &TagSet) -> Vec<String> {
        self.decode(tokens, vocab).into_tags()
    }
}

/// Bigram HMM tagger over one statistics snapshot.
///
/// Holds private caches; use one instance per thread.
pub struct ViterbiTagger<'a> {
    model: ProbabilityModel<'a>,
    ctx: HmmContext,
}

impl<'a> ViterbiTagger<'a> {
    pub fn new(stats: &'a CorpusStats) -> Self {
        Self { model: ProbabilityModel::new(stats), ctx: HmmContext::new(0, 0) }
    }

    pub fn stats(&self) -> &'a CorpusStats {
        self.model.stats()
    }

    pub fn model(&self) -> &ProbabilityModel<'a> {
        &self.model
    }

    /// Fill the lattice for `tokens` and run Viterbi over it.
    fn viterbi<S: AsRef<str>>(&mut self, tokens: &[S], vocab: &TagSet) -> Result<Vec<String>, DecodeError> {
        if vocab.is_empty() {
            return Err(DecodeError::EmptyVocabulary);
        }
        if self.stats().total_words == 0 {
            return Err(DecodeError::EmptyCorpus);
        }
        let l = vocab.len();
        self.ctx.set_num_labels(l);
        self.ctx.set_num_items(tokens.len());

        for (i, prev) in vocab.iter().enumerate() {
            self.ctx.init[i] = self.model.initial_log_prob(prev);
            for (j, curr) in vocab.iter().enumerate() {
                self.ctx.trans[l * i + j] = self.model.transition_log_prob(prev, curr);
            }
        }
        for (t, token) in tokens.iter().enumerate() {
            for (j, tag) in vocab.iter().enumerate() {
                self.ctx.state[l * t + j] = self.model.emission_log_prob(token.as_ref(), tag);
            }
        }

        let (labels, score) = self.ctx.viterbi().ok_or(DecodeError::NoPath)?;
        log::debug!("decoded {} tokens over {} tags, score {score}", tokens.len(), l);
        labels
            .into_iter()
            .map(|j| vocab.to_str(j).map(str::to_string).ok_or(DecodeError::NoPath))
            .collect()
    }
}

impl Tagger for ViterbiTagger<'_> {
    fn decode<S: AsRef<str>>(&mut self, tokens: &[S], vocab: &TagSet) -> Decoded {
        if tokens.is_empty() {
            return Decoded::Viterbi(Vec::new());
        }
        /* Caches never carry over from a previous sentence. */
        self.model.clear();
        match self.viterbi(tokens, vocab) {
            Ok(tags) => Decoded::Viterbi(tags),
            Err(reason) => {
                log::warn!("viterbi decode failed: {reason}; falling back to the most frequent tag");
                let tag = fallback_tag(self.stats(), vocab);
                Decoded::Fallback { tags: vec![tag; tokens.len()], reason }
            }
        }
    }
}

/// Most frequent tag in `vocab`, else in the corpus, else [`UNKNOWN_TAG`].
pub fn fallback_tag(stats: &CorpusStats, vocab: &TagSet) -> String {
    stats
        .most_frequent_tag(vocab.iter())
        .or_else(|| stats.most_frequent_tag(stats.tags()))
        .unwrap_or(UNKNOWN_TAG)
        .to_string()
}
