use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a tagged corpus from disk.
#[derive(Debug, Error)]
pub enum CorpusLoadError {
    #[error("corpus file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("malformed corpus {}: {message}", path.display())]
    MalformedData { path: PathBuf, message: String },
    #[error("failed to read corpus {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CorpusLoadError {
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source },
        }
    }

    pub(crate) fn from_json(path: PathBuf, err: serde_json::Error) -> Self {
        /* serde_json reports read failures through its own error type. */
        if err.is_io() {
            return Self::from_io(path, err.into());
        }
        Self::MalformedData { path, message: err.to_string() }
    }
}

/// Internal decoder fault. Never returned to callers of the tagger; it is
/// recorded as the reason of a fallback decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("tag vocabulary is empty")]
    EmptyVocabulary,
    #[error("corpus statistics contain no tokens")]
    EmptyCorpus,
    #[error("no finite path through the lattice")]
    NoPath,
}

/// Input rejected by the answer scorer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("question and user_answer are required")]
    MissingInput,
    #[error("the 'question' parameter should be a question, but got: '{0}'")]
    NotAQuestion(String),
    #[error("keyword not found in question: '{0}'")]
    UnknownKeyword(String),
    #[error("number of questions ({questions}) and answers ({answers}) differ")]
    UnbalancedConversation { questions: usize, answers: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Corpus(#[from] CorpusLoadError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
