use std::path::PathBuf;

use clap::Args;

use crate::evaluation::DEFAULT_WORKERS;

pub const DEFAULT_CORPUS: &str = "corpus.json";

/// Settings shared by the command-line tool and the HTTP service.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// tagged corpus to build the model from (JSON: sentences of [word, tag] pairs)
    #[arg(short, long, env = "HMMTAG_CORPUS", default_value = DEFAULT_CORPUS, value_name = "CORPUS")]
    pub corpus: PathBuf,
    /// number of threads used when evaluating
    #[arg(short, long, env = "HMMTAG_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self { corpus: PathBuf::from(DEFAULT_CORPUS), workers: DEFAULT_WORKERS }
    }
}
